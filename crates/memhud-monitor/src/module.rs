//! Host integration for the memory monitor.
//!
//! The module registers the enable toggle during the configuration phase,
//! applies the stored value once the host is ready, and routes events to
//! the widget. The Ctrl+M shortcut only flips the persisted setting; the
//! resulting change notification is what actually drives activation, so
//! the settings UI and the hotkey share one code path.

use crate::monitor::MemoryMonitor;
use memhud_host::{Host, HostEvent, Module, SettingScope, SettingSpec};
use tracing::warn;

/// Settings namespace owned by this module.
pub const NAMESPACE: &str = "memory-monitor";

/// Key of the enable toggle.
pub const ENABLED_KEY: &str = "enabled";

/// Letter half of the Ctrl toggle chord, matched case-insensitively.
const TOGGLE_KEY: char = 'm';

#[derive(Default)]
pub struct MonitorModule {
    monitor: MemoryMonitor,
    /// The shortcut is armed at ready, never before
    hotkey_armed: bool,
}

impl MonitorModule {
    pub fn new() -> Self {
        Self::default()
    }

    fn toggle_setting(&self, host: &mut Host) {
        let current = host
            .settings
            .get_bool(NAMESPACE, ENABLED_KEY)
            .unwrap_or(false);
        if let Err(err) = host.settings.set_bool(NAMESPACE, ENABLED_KEY, !current) {
            warn!("memory monitor: could not toggle setting: {err}");
        }
    }
}

impl Module for MonitorModule {
    fn setup(&mut self, host: &mut Host) {
        host.settings.register(SettingSpec {
            namespace: NAMESPACE.to_string(),
            key: ENABLED_KEY.to_string(),
            name: "Enable memory monitor".to_string(),
            hint: "Show live heap usage above the player list.".to_string(),
            scope: SettingScope::Client,
            default: false,
            show_in_config: true,
        });
    }

    fn ready(&mut self, host: &mut Host) {
        let enabled = host
            .settings
            .get_bool(NAMESPACE, ENABLED_KEY)
            .unwrap_or(false);
        self.monitor.set_active(host, enabled);
        self.hotkey_armed = true;
    }

    fn handle_event(&mut self, host: &mut Host, event: &HostEvent) {
        match event {
            HostEvent::KeyDown { key, ctrl: true }
                if self.hotkey_armed && key.eq_ignore_ascii_case(&TOGGLE_KEY) =>
            {
                self.toggle_setting(host);
            }
            HostEvent::SettingChanged {
                namespace,
                key,
                value,
            } if namespace == NAMESPACE && key == ENABLED_KEY => {
                self.monitor.set_active(host, *value);
            }
            HostEvent::Resized { .. } => {
                // Repositioning stays independent of the sampling tick so
                // resize responsiveness is not tied to the 5-second period
                self.monitor.reposition(host);
            }
            HostEvent::Timer(id) if self.monitor.owns_timer(*id) => {
                self.monitor.render(host);
            }
            HostEvent::Shutdown => {
                self.monitor.deactivate(host);
            }
            _ => {}
        }
    }
}
