//! Events delivered by the host runtime to registered modules.

use crate::timers::TimerId;

/// Everything a module can observe. Events are delivered on the host's
/// single dispatch thread, one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A key went down somewhere in the host UI
    KeyDown { key: char, ctrl: bool },
    /// The host window was resized (logical pixels)
    Resized { width: u32, height: u32 },
    /// A repeating interval came due
    Timer(TimerId),
    /// A registered setting changed value
    SettingChanged {
        namespace: String,
        key: String,
        value: bool,
    },
    /// The host is shutting down
    Shutdown,
}
