//! Ledge desktop entry point.

fn main() { ledge_lib::run(); }
