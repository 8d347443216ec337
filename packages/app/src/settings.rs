//! Persisted runtime preferences.
//!
//! The preferred edge and accent color outlive the process: the edge is
//! rewritten every time the panel docks, the color every time the config
//! changes it. Persistence is best effort; a failed write logs and keeps
//! the in-memory value.

use std::fs;
use std::path::PathBuf;

use ledge_shared::{AccentColor, LedgeConfig, PanelEdge};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::docking::SettingsStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PersistedSettings {
    preferred_edge: PanelEdge,
    accent_color: AccentColor,
}

/// Settings store backed by a JSON file in the user data directory.
pub struct FileSettingsStore {
    state: Mutex<PersistedSettings>,
    path: Option<PathBuf>,
}

impl FileSettingsStore {
    /// Opens the store at the default location, seeding missing values from
    /// the configuration.
    #[must_use]
    pub fn new(config: &LedgeConfig) -> Self {
        let path = dirs::data_dir().map(|dir| dir.join("ledge").join("settings.json"));
        Self::at_path(path, config)
    }

    /// Opens the store at an explicit path.
    #[must_use]
    pub fn at_path(path: Option<PathBuf>, config: &LedgeConfig) -> Self {
        let state = path
            .as_deref()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| PersistedSettings {
                preferred_edge: config.panel.preferred_edge,
                accent_color: config.panel.color.clone(),
            });

        Self { state: Mutex::new(state), path }
    }

    fn save(&self, state: &PersistedSettings) {
        let Some(path) = self.path.as_deref() else {
            return;
        };

        let result = serde_json::to_string_pretty(state).map_err(std::io::Error::other).and_then(
            |json| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json)
            },
        );

        if let Err(err) = result {
            eprintln!("ledge: failed to save settings: {err}");
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn preferred_edge(&self) -> PanelEdge { self.state.lock().preferred_edge }

    fn set_preferred_edge(&self, edge: PanelEdge) {
        let mut state = self.state.lock();
        if state.preferred_edge == edge {
            return;
        }

        state.preferred_edge = edge;
        let snapshot = state.clone();
        drop(state);

        self.save(&snapshot);
    }

    fn accent_color(&self) -> AccentColor { self.state.lock().accent_color.clone() }

    fn set_accent_color(&self, color: AccentColor) {
        let mut state = self.state.lock();
        if state.accent_color == color {
            return;
        }

        state.accent_color = color;
        let snapshot = state.clone();
        drop(state);

        self.save(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ledge-settings-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn test_seeds_from_config_when_no_file() {
        let config = LedgeConfig {
            panel: ledge_shared::PanelConfig {
                preferred_edge: PanelEdge::Left,
                color: AccentColor::new("#123456"),
                ..Default::default()
            },
            ..Default::default()
        };

        let store = FileSettingsStore::at_path(None, &config);

        assert_eq!(store.preferred_edge(), PanelEdge::Left);
        assert_eq!(store.accent_color(), AccentColor::new("#123456"));
    }

    #[test]
    fn test_round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let config = LedgeConfig::default();

        let store = FileSettingsStore::at_path(Some(path.clone()), &config);
        store.set_preferred_edge(PanelEdge::Left);
        store.set_accent_color(AccentColor::new("#ABCDEF"));

        let reopened = FileSettingsStore::at_path(Some(path.clone()), &config);
        assert_eq!(reopened.preferred_edge(), PanelEdge::Left);
        assert_eq!(reopened.accent_color(), AccentColor::new("#ABCDEF"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_unchanged_value_skips_write() {
        let path = temp_path("nowrite");
        let config = LedgeConfig::default();

        let store = FileSettingsStore::at_path(Some(path.clone()), &config);
        store.set_preferred_edge(config.panel.preferred_edge);

        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_config() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ not json").unwrap();

        let store = FileSettingsStore::at_path(Some(path.clone()), &LedgeConfig::default());
        assert_eq!(store.preferred_edge(), PanelEdge::Right);

        let _ = fs::remove_file(path);
    }
}
