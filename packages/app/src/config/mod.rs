//! Runtime configuration access and hot reloading.
//!
//! The configuration is loaded once at startup and then watched on disk.
//! A change does not restart anything: the watcher swaps the cached config,
//! pushes the new accent color and preferred edge into the settings store
//! and posts [`DockEvent::ColorPreferenceChanged`] so visible surfaces
//! refresh in place.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use ledge_shared::{ConfigError, LedgeConfig, load_config};
use notify::{RecursiveMode, Watcher};
use parking_lot::RwLock;

use crate::docking::{DockEvent, EventSender, SettingsStore};

/// Minimum gap between reloads; editors tend to fire bursts of events.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

static CONFIG: OnceLock<RwLock<LedgeConfig>> = OnceLock::new();
static CONFIG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

fn config_cell() -> &'static RwLock<LedgeConfig> {
    CONFIG.get_or_init(|| RwLock::new(LedgeConfig::default()))
}

/// Loads the configuration from disk. A missing file is not an error; the
/// defaults apply and no watcher will be started.
pub fn init() {
    let (config, path) = match load_config() {
        Ok((config, path)) => (config, Some(path)),
        Err(ConfigError::NotFound) => (LedgeConfig::default(), None),
        Err(err) => {
            eprintln!("ledge: {err}");
            (LedgeConfig::default(), None)
        }
    };

    *config_cell().write() = config;
    let _ = CONFIG_PATH.set(path);
}

/// Returns a snapshot of the current configuration.
#[must_use]
pub fn get_config() -> LedgeConfig { config_cell().read().clone() }

/// Returns the path the configuration was loaded from, if any.
#[must_use]
pub fn config_path() -> Option<PathBuf> { CONFIG_PATH.get().cloned().flatten() }

/// Pushes a reloaded configuration into the settings store and notifies the
/// controller when the accent color changed.
fn apply_config_update(
    old: &LedgeConfig,
    new: &LedgeConfig,
    settings: &dyn SettingsStore,
    sender: &EventSender,
) {
    if new.panel.preferred_edge != old.panel.preferred_edge {
        settings.set_preferred_edge(new.panel.preferred_edge);
    }

    if new.panel.color != old.panel.color {
        settings.set_accent_color(new.panel.color.clone());
        sender.post(DockEvent::ColorPreferenceChanged);
    }
}

fn reload(settings: &Arc<dyn SettingsStore>, sender: &EventSender) {
    match load_config() {
        Ok((new, _)) => {
            let old = get_config();
            apply_config_update(&old, &new, settings.as_ref(), sender);
            *config_cell().write() = new;
        }
        Err(err) => eprintln!("ledge: config reload failed: {err}"),
    }
}

/// Watches the configuration file and applies changes in place.
///
/// Does nothing when the configuration came from defaults rather than a
/// file. The watcher thread runs for the lifetime of the process.
pub fn watch_config_file(sender: EventSender, settings: Arc<dyn SettingsStore>) {
    let Some(path) = config_path() else {
        return;
    };

    thread::spawn(move || {
        let (tx, rx) = mpsc::channel();

        let mut watcher = match notify::recommended_watcher(tx) {
            Ok(watcher) => watcher,
            Err(err) => {
                eprintln!("ledge: failed to create config watcher: {err}");
                return;
            }
        };

        if let Err(err) = watcher.watch(&path, RecursiveMode::NonRecursive) {
            eprintln!("ledge: failed to watch {}: {err}", path.display());
            return;
        }

        let mut last_reload: Option<Instant> = None;

        for event in rx {
            match event {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if last_reload.is_some_and(|at| at.elapsed() < RELOAD_DEBOUNCE) {
                        continue;
                    }

                    last_reload = Some(Instant::now());
                    reload(&settings, &sender);
                }
                Ok(_) => {}
                Err(err) => eprintln!("ledge: config watcher error: {err}"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use ledge_shared::{AccentColor, PanelConfig, PanelEdge};
    use parking_lot::Mutex;

    use super::*;

    fn config_with(panel: PanelConfig) -> LedgeConfig {
        LedgeConfig { panel, ..Default::default() }
    }

    #[derive(Default)]
    struct MemorySettings {
        edge: Mutex<Option<PanelEdge>>,
        color: Mutex<Option<AccentColor>>,
    }

    impl SettingsStore for MemorySettings {
        fn preferred_edge(&self) -> PanelEdge { self.edge.lock().unwrap_or_default() }

        fn set_preferred_edge(&self, edge: PanelEdge) { *self.edge.lock() = Some(edge); }

        fn accent_color(&self) -> AccentColor { self.color.lock().clone().unwrap_or_default() }

        fn set_accent_color(&self, color: AccentColor) { *self.color.lock() = Some(color); }
    }

    #[test]
    fn test_color_change_updates_store_and_posts_event() {
        let settings = MemorySettings::default();
        let sender = EventSender::new();

        let old = LedgeConfig::default();
        let new = config_with(PanelConfig {
            color: AccentColor::new("#00FF00"),
            ..Default::default()
        });

        apply_config_update(&old, &new, &settings, &sender);

        assert_eq!(settings.accent_color(), AccentColor::new("#00FF00"));
        assert_eq!(sender.queue().take_all(), vec![DockEvent::ColorPreferenceChanged]);
    }

    #[test]
    fn test_unchanged_config_posts_nothing() {
        let settings = MemorySettings::default();
        let sender = EventSender::new();

        let config = LedgeConfig::default();
        apply_config_update(&config, &config.clone(), &settings, &sender);

        assert!(sender.queue().take_all().is_empty());
        assert!(settings.color.lock().is_none());
    }

    #[test]
    fn test_edge_change_updates_store_without_color_event() {
        let settings = MemorySettings::default();
        let sender = EventSender::new();

        let old = LedgeConfig::default();
        let new = config_with(PanelConfig {
            preferred_edge: PanelEdge::Left,
            ..Default::default()
        });

        apply_config_update(&old, &new, &settings, &sender);

        assert_eq!(settings.preferred_edge(), PanelEdge::Left);
        assert!(sender.queue().take_all().is_empty());
    }

    #[test]
    fn test_get_config_before_init_yields_defaults() {
        let config = get_config();
        assert!(config.animations.is_enabled());
    }
}
