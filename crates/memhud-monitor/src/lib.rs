//! memhud Memory Monitor
//!
//! The diagnostic overlay widget: samples the host's heap counter on a
//! fixed interval and pins the formatted reading just above the player
//! list. Toggled by a persisted per-client setting and Ctrl+M.

mod module;
mod monitor;

pub use module::{MonitorModule, ENABLED_KEY, NAMESPACE};
pub use monitor::{format_heap, MemoryMonitor, ANCHOR_ID, OVERLAY_ID, SAMPLE_PERIOD};
