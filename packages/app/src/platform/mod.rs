//! Platform integration.

#[cfg(target_os = "macos")]
pub mod macos;
