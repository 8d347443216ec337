//! Configuration types for Ledge.
//!
//! This module provides the configuration types and loading functionality
//! for the panel shell.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Screen edge the panel prefers to dock against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum PanelEdge {
    /// Dock against the left edge of the work area.
    Left,
    /// Dock against the right edge of the work area. This is the default.
    #[default]
    Right,
}

/// Accent color for the indicator strip and effect surfaces.
///
/// Stored as a `#RRGGBB` or `#RRGGBBAA` hex string. Invalid values fall back
/// to the default accent at the call site via [`AccentColor::rgba`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AccentColor(pub String);

impl Default for AccentColor {
    fn default() -> Self { Self("#FF9F0A".to_string()) }
}

impl AccentColor {
    /// Creates an accent color from a hex string.
    #[must_use]
    pub fn new(hex: impl Into<String>) -> Self { Self(hex.into()) }

    /// Returns whether the stored string is a parseable hex color.
    #[must_use]
    pub fn is_valid(&self) -> bool { parse_hex(&self.0).is_some() }

    /// Returns the color as `(r, g, b, a)` components.
    ///
    /// Falls back to the default accent color when the stored string is not
    /// a valid `#RRGGBB`/`#RRGGBBAA` value.
    #[must_use]
    pub fn rgba(&self) -> (u8, u8, u8, u8) {
        parse_hex(&self.0).unwrap_or_else(|| {
            parse_hex(&Self::default().0).unwrap_or((255, 159, 10, 255))
        })
    }
}

/// Parses a `#RRGGBB` or `#RRGGBBAA` hex string.
fn parse_hex(value: &str) -> Option<(u8, u8, u8, u8)> {
    let digits = value.strip_prefix('#')?;
    if digits.len() != 6 && digits.len() != 8 {
        return None;
    }

    let component = |range: std::ops::Range<usize>| {
        u8::from_str_radix(digits.get(range)?, 16).ok()
    };

    let r = component(0..2)?;
    let g = component(2..4)?;
    let b = component(4..6)?;
    let a = if digits.len() == 8 { component(6..8)? } else { 255 };

    Some((r, g, b, a))
}

/// Easing function used for panel frame animations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum EasingFunction {
    /// Constant velocity.
    Linear,
    /// Accelerate from zero velocity.
    EaseIn,
    /// Decelerate to zero velocity.
    EaseOut,
    /// Accelerate then decelerate. This is the default.
    #[default]
    EaseInOut,
    /// Overshoot slightly and settle, for a springy feel.
    Spring,
}

/// Concrete animation settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationSettings {
    /// Animation duration in milliseconds.
    pub duration: u32,

    /// Easing function to apply.
    pub easing: EasingFunction,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration: 250,
            easing: EasingFunction::default(),
        }
    }
}

/// Animation configuration.
///
/// Accepts either a plain boolean (`"animations": false`) or a settings
/// object (`"animations": { "duration": 300, "easing": "spring" }`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnimationConfig {
    /// Enable or disable animations with default settings.
    Enabled(bool),
    /// Enable animations with explicit settings.
    Settings(AnimationSettings),
}

impl Default for AnimationConfig {
    fn default() -> Self { Self::Enabled(true) }
}

impl AnimationConfig {
    /// Returns whether animations are enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Settings(_) => true,
        }
    }

    /// Returns the effective animation settings.
    ///
    /// Disabled animations report a zero duration so callers can apply
    /// target frames immediately.
    #[must_use]
    pub fn settings(&self) -> AnimationSettings {
        match self {
            Self::Enabled(true) => AnimationSettings::default(),
            Self::Enabled(false) => AnimationSettings {
                duration: 0,
                ..AnimationSettings::default()
            },
            Self::Settings(settings) => *settings,
        }
    }
}

/// Panel behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelConfig {
    /// Edge the panel docks against when summoned or minimized.
    ///
    /// This is also updated at runtime whenever the user drags the panel
    /// onto an edge, so it reflects the last edge actually used.
    pub preferred_edge: PanelEdge,

    /// Accent color for the indicator strip and glow effects.
    pub color: AccentColor,

    /// Whether to show the indicator strip at the preferred edge when the
    /// app loses focus while the panel is floating (summon mode).
    pub summon_on_deactivate: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            preferred_edge: PanelEdge::default(),
            color: AccentColor::default(),
            summon_on_deactivate: true,
        }
    }
}

/// The complete Ledge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgeConfig {
    /// Panel behavior configuration.
    pub panel: PanelConfig,

    /// Animation configuration.
    pub animations: AnimationConfig,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.ledge.json or $XDG_CONFIG_HOME/ledge/config.json"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations:
/// 1. `$XDG_CONFIG_HOME/ledge/config.json` (if `XDG_CONFIG_HOME` is set)
/// 2. `~/.config/ledge/config.json` (XDG default, also checked on macOS)
/// 3. `~/Library/Application Support/ledge/config.json` (macOS native)
/// 4. `~/.ledge.json` (legacy/simple location)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Check XDG_CONFIG_HOME first if explicitly set
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg_config).join("ledge").join("config.json"));
    }

    if let Some(home) = dirs::home_dir() {
        let xdg_default = home.join(".config").join("ledge").join("config.json");
        if !paths.contains(&xdg_default) {
            paths.push(xdg_default);
        }

        paths.push(
            home.join("Library")
                .join("Application Support")
                .join("ledge")
                .join("config.json"),
        );
        paths.push(home.join(".ledge.json"));
    }

    paths
}

/// Loads the configuration from the first existing path.
///
/// Returns the parsed configuration together with the path it was loaded
/// from so callers can watch the file for changes.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could
/// not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains
/// invalid JSON.
pub fn load_config() -> Result<(LedgeConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let file = fs::File::open(&path)?;
            // Strip comments from JSONC before parsing
            let reader = json_comments::StripComments::new(file);
            let config: LedgeConfig = serde_json::from_reader(reader)?;
            return Ok((config, path));
        }
    }

    Err(ConfigError::NotFound)
}
