//! Registered client settings with live change notification.
//!
//! Values persist as a small JSON document when a backing file is
//! configured. Every successful `set_bool` emits a `SettingChanged` event
//! into the host channel, so interested modules react to changes no matter
//! where they came from (settings UI, hotkey, API).

use crate::event::HostEvent;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage scope for a registered setting. Only per-client storage exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingScope {
    /// Stored per client/user
    Client,
}

/// Declaration of a boolean setting, registered during the configuration
/// phase.
#[derive(Debug, Clone)]
pub struct SettingSpec {
    pub namespace: String,
    pub key: String,
    /// Display name shown in the host's settings UI
    pub name: String,
    /// Longer description shown under the name
    pub hint: String,
    pub scope: SettingScope,
    pub default: bool,
    /// Whether the setting appears in the host's settings UI
    pub show_in_config: bool,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("setting {namespace}.{key} is not registered")]
    Unregistered { namespace: String, key: String },
}

/// On-disk settings payload.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    values: HashMap<String, bool>,
}

/// The host's settings store.
pub struct SettingsStore {
    specs: HashMap<String, SettingSpec>,
    values: HashMap<String, bool>,
    path: Option<PathBuf>,
    events: Sender<HostEvent>,
}

impl SettingsStore {
    pub fn new(events: Sender<HostEvent>) -> Self {
        Self {
            specs: HashMap::new(),
            values: HashMap::new(),
            path: None,
            events,
        }
    }

    /// Attach a backing file and pull any stored values from it. Values for
    /// keys that register later are kept until registration picks them up.
    pub fn load_from(&mut self, path: PathBuf) {
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<SettingsFile>(&raw) {
                Ok(file) => {
                    debug!("loaded {} settings from {}", file.values.len(), path.display());
                    self.values = file.values;
                }
                Err(err) => warn!("ignoring malformed settings file {}: {err}", path.display()),
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not read settings file {}: {err}", path.display()),
        }
        self.path = Some(path);
    }

    /// Register a setting. A stored value survives; otherwise the declared
    /// default is installed.
    pub fn register(&mut self, spec: SettingSpec) {
        let qualified = qualify(&spec.namespace, &spec.key);
        self.values.entry(qualified.clone()).or_insert(spec.default);
        debug!("registered setting {qualified} ({:?})", spec.scope);
        self.specs.insert(qualified, spec);
    }

    pub fn is_registered(&self, namespace: &str, key: &str) -> bool {
        self.specs.contains_key(&qualify(namespace, key))
    }

    /// Declaration metadata for a registered setting.
    pub fn spec(&self, namespace: &str, key: &str) -> Option<&SettingSpec> {
        self.specs.get(&qualify(namespace, key))
    }

    pub fn get_bool(&self, namespace: &str, key: &str) -> Result<bool, SettingsError> {
        let qualified = qualify(namespace, key);
        if !self.specs.contains_key(&qualified) {
            return Err(SettingsError::Unregistered {
                namespace: namespace.to_string(),
                key: key.to_string(),
            });
        }
        Ok(self.values.get(&qualified).copied().unwrap_or(false))
    }

    /// Store a new value, persist it, and emit `SettingChanged`. The change
    /// event fires on every set, matching live-update callbacks in the
    /// host's settings UI.
    pub fn set_bool(&mut self, namespace: &str, key: &str, value: bool) -> Result<(), SettingsError> {
        let qualified = qualify(namespace, key);
        if !self.specs.contains_key(&qualified) {
            return Err(SettingsError::Unregistered {
                namespace: namespace.to_string(),
                key: key.to_string(),
            });
        }
        self.values.insert(qualified.clone(), value);
        debug!("setting {qualified} -> {value}");
        self.save();
        let _ = self.events.send(HostEvent::SettingChanged {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn save(&self) {
        let Some(path) = &self.path else { return };
        let file = SettingsFile {
            values: self.values.clone(),
        };
        let payload = match serde_json::to_string_pretty(&file) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("could not serialize settings: {err}");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!("could not create {}: {err}", parent.display());
                return;
            }
        }
        if let Err(err) = fs::write(path, payload) {
            warn!("could not write settings file {}: {err}", path.display());
        }
    }
}

fn qualify(namespace: &str, key: &str) -> String {
    format!("{namespace}.{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn toggle_spec() -> SettingSpec {
        SettingSpec {
            namespace: "memory-monitor".to_string(),
            key: "enabled".to_string(),
            name: "Enable memory monitor".to_string(),
            hint: "Show live heap usage above the player list.".to_string(),
            scope: SettingScope::Client,
            default: false,
            show_in_config: true,
        }
    }

    #[test]
    fn test_register_installs_default() {
        let (tx, _rx) = unbounded();
        let mut store = SettingsStore::new(tx);
        store.register(toggle_spec());

        assert!(store.is_registered("memory-monitor", "enabled"));
        assert!(!store.get_bool("memory-monitor", "enabled").unwrap());
        assert_eq!(
            store.spec("memory-monitor", "enabled").unwrap().name,
            "Enable memory monitor"
        );
    }

    #[test]
    fn test_set_emits_change_event() {
        let (tx, rx) = unbounded();
        let mut store = SettingsStore::new(tx);
        store.register(toggle_spec());

        store.set_bool("memory-monitor", "enabled", true).unwrap();
        assert!(store.get_bool("memory-monitor", "enabled").unwrap());

        match rx.try_recv().unwrap() {
            HostEvent::SettingChanged {
                namespace,
                key,
                value,
            } => {
                assert_eq!(namespace, "memory-monitor");
                assert_eq!(key, "enabled");
                assert!(value);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_access_errors() {
        let (tx, rx) = unbounded();
        let mut store = SettingsStore::new(tx);

        assert!(store.get_bool("memory-monitor", "enabled").is_err());
        assert!(store.set_bool("memory-monitor", "enabled", true).is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_values_survive_reload() {
        let path = PathBuf::from("/tmp/memhud-test-settings/settings.json");
        let _ = fs::remove_file(&path);

        let (tx, _rx) = unbounded();
        let mut store = SettingsStore::new(tx);
        store.load_from(path.clone());
        store.register(toggle_spec());
        store.set_bool("memory-monitor", "enabled", true).unwrap();

        // A fresh store reading the same file sees the stored value, and
        // registration does not clobber it with the default.
        let (tx, _rx) = unbounded();
        let mut reloaded = SettingsStore::new(tx);
        reloaded.load_from(path);
        reloaded.register(toggle_spec());
        assert!(reloaded.get_bool("memory-monitor", "enabled").unwrap());
    }
}
