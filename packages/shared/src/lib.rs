//! Shared types and utilities for Ledge.
//!
//! This crate provides the configuration types used by the desktop app.

pub mod config;
pub mod schema;

pub use config::{
    AccentColor, AnimationConfig, AnimationSettings, ConfigError, EasingFunction, LedgeConfig,
    PanelConfig, PanelEdge, config_paths, load_config,
};
pub use schema::{generate_schema, generate_schema_json};
