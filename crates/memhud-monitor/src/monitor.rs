//! The memory monitor widget.
//!
//! At most one overlay element and one sampling interval exist at a time;
//! the `Option<ActiveOverlay>` record keeps their lifecycles paired, so a
//! torn-down monitor never leaves a stray element or timer behind.

use memhud_host::{ElementId, HeapSample, Host, TimerId, WatchId};
use std::time::Duration;
use tracing::{debug, warn};

/// Stable id of the overlay element.
pub const OVERLAY_ID: &str = "memory-monitor";

/// Container the overlay is pinned above.
pub const ANCHOR_ID: &str = "players";

/// How often the heap counter is sampled while active.
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(5);

/// Vertical gap between the overlay and the anchor's top edge (logical px)
const ANCHOR_GAP: f32 = 28.0;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Format a heap sample for display.
pub fn format_heap(sample: &HeapSample) -> String {
    format!(
        "Memory: {:.2} MB / {:.2} MB",
        sample.used_bytes as f64 / BYTES_PER_MB,
        sample.total_bytes as f64 / BYTES_PER_MB,
    )
}

/// Everything the active monitor owns. Created and destroyed as a unit.
struct ActiveOverlay {
    element: ElementId,
    timer: TimerId,
    resize_watch: WatchId,
}

/// The overlay widget. `set_active` is the single external entry point and
/// is idempotent in both directions.
#[derive(Default)]
pub struct MemoryMonitor {
    active: Option<ActiveOverlay>,
}

impl MemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// True when `id` is this widget's sampling interval.
    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.active.as_ref().is_some_and(|a| a.timer == id)
    }

    /// Apply an enable/disable signal.
    pub fn set_active(&mut self, host: &mut Host, enabled: bool) {
        if enabled {
            self.activate(host);
        } else {
            self.deactivate(host);
        }
    }

    /// Bring up the overlay. No-op when already active; aborts with zero
    /// side effects when the heap counter or the anchor container is
    /// missing.
    pub fn activate(&mut self, host: &mut Host) {
        if self.active.is_some() {
            return;
        }

        // The activation sample doubles as the capability check: nothing is
        // inserted into the document unless the counter answered.
        let Some(sample) = host.sample_heap() else {
            host.warn_user("Memory monitor: heap usage counter not available in this environment.");
            return;
        };

        let Some(anchor) = host.document.container_rect(ANCHOR_ID) else {
            warn!("memory monitor: could not find '{ANCHOR_ID}' container");
            return;
        };

        let element = host.document.insert_overlay(OVERLAY_ID);
        host.document
            .set_overlay_position(element, anchor.left, anchor.top - ANCHOR_GAP);
        let resize_watch = host.watch_resize();
        host.document.set_overlay_text(element, &format_heap(&sample));
        let timer = host.set_interval(SAMPLE_PERIOD);

        self.active = Some(ActiveOverlay {
            element,
            timer,
            resize_watch,
        });
        debug!("memory monitor activated as {element}");
    }

    /// Tear the overlay down. No-op when inactive. The resize watch, the
    /// element, and the interval are always released together.
    pub fn deactivate(&mut self, host: &mut Host) {
        let Some(active) = self.active.take() else {
            return;
        };

        host.unwatch_resize(active.resize_watch);
        host.document.remove_overlay(active.element);
        host.clear_interval(active.timer);
        debug!("memory monitor deactivated");
    }

    /// Sampling cycle: read the counter and rewrite the overlay text.
    /// Invoked by the module on every owned timer event.
    pub fn render(&mut self, host: &mut Host) {
        let Some(active) = &self.active else { return };
        let element = active.element;

        match host.sample_heap() {
            Some(sample) => host.document.set_overlay_text(element, &format_heap(&sample)),
            // Keep the last good reading on the screen
            None => debug!("memory monitor: heap counter returned nothing this tick"),
        }
    }

    /// Re-pin the overlay above the anchor's current position. Invoked by
    /// the module on every resize event while active.
    pub fn reposition(&mut self, host: &mut Host) {
        let Some(active) = &self.active else { return };

        if let Some(anchor) = host.document.container_rect(ANCHOR_ID) {
            host.document
                .set_overlay_position(active.element, anchor.left, anchor.top - ANCHOR_GAP);
        }
    }
}
