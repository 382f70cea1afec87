//! memhud Host Runtime
//!
//! The single-threaded environment diagnostic widgets plug into:
//! - document: retained layout containers and top-level overlay elements
//! - settings: registered client settings with live change notification
//! - timers: repeating intervals driven by the event loop
//! - capabilities: heap-usage probe and user-facing notifier
//! - lifecycle: one-shot setup/ready signals, then sequential event dispatch

mod document;
mod event;
mod host;
mod notify;
mod probe;
mod settings;
mod timers;

pub use document::{Document, ElementId, Overlay, Rect};
pub use event::HostEvent;
pub use host::{Host, HostRuntime, Module, WatchId};
pub use notify::{LogNotifier, Notifier};
pub use probe::{HeapSample, MemoryProbe, ProcessProbe};
pub use settings::{SettingScope, SettingSpec, SettingsError, SettingsStore};
pub use timers::{TimerId, Timers};
