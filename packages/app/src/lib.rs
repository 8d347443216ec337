//! Ledge - a floating note panel that docks to macOS screen edges.
//!
//! The docking state machine and its geometry are platform neutral and fully
//! tested off-device; only the thin `platform::macos` layer talks to AppKit.

pub mod config;
pub mod docking;
pub mod platform;
pub mod settings;

/// Starts the panel. On macOS this runs the AppKit main loop and never
/// returns.
pub fn run() {
    #[cfg(target_os = "macos")]
    platform::macos::run();

    #[cfg(not(target_os = "macos"))]
    eprintln!("ledge: this platform is not supported; the panel requires macOS");
}
