//! Repeating intervals driven by the host event loop.
//!
//! The loop asks for the next deadline, waits at most that long for an
//! event, then pops whatever came due and delivers each as a `Timer` event.

use std::fmt;
use std::time::{Duration, Instant};

/// Unique identifier for a repeating interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer({})", self.0)
    }
}

#[derive(Debug)]
struct Interval {
    id: TimerId,
    period: Duration,
    next_due: Instant,
}

/// Table of active intervals.
#[derive(Debug, Default)]
pub struct Timers {
    intervals: Vec<Interval>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repeating interval. The first fire is one period after
    /// `now`.
    pub fn set_interval(&mut self, period: Duration, now: Instant) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.intervals.push(Interval {
            id,
            period,
            next_due: now + period,
        });
        id
    }

    /// Remove an interval. Returns false if it was not active.
    pub fn clear_interval(&mut self, id: TimerId) -> bool {
        match self.intervals.iter().position(|i| i.id == id) {
            Some(index) => {
                self.intervals.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.intervals.iter().any(|i| i.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.intervals.len()
    }

    /// All armed interval ids.
    pub fn ids(&self) -> Vec<TimerId> {
        self.intervals.iter().map(|i| i.id).collect()
    }

    /// Earliest deadline among active intervals.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.intervals.iter().map(|i| i.next_due).min()
    }

    /// Pop every interval due at `now`. Each popped interval re-arms
    /// relative to delivery, so a slow loop does not burst-fire.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due = Vec::new();
        for interval in &mut self.intervals {
            if interval.next_due <= now {
                interval.next_due = now + interval.period;
                due.push(interval.id);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_scheduling() {
        let mut timers = Timers::new();
        let now = Instant::now();

        let id = timers.set_interval(Duration::from_secs(5), now);
        assert_eq!(timers.active_count(), 1);
        assert_eq!(timers.next_deadline(), Some(now + Duration::from_secs(5)));

        // Not due yet
        assert!(timers.pop_due(now + Duration::from_secs(4)).is_empty());

        // Due, and re-armed one period past delivery
        let fired = timers.pop_due(now + Duration::from_secs(5));
        assert_eq!(fired, vec![id]);
        assert_eq!(
            timers.next_deadline(),
            Some(now + Duration::from_secs(10))
        );
    }

    #[test]
    fn test_cleared_interval_never_fires() {
        let mut timers = Timers::new();
        let now = Instant::now();

        let id = timers.set_interval(Duration::from_secs(1), now);
        assert!(timers.clear_interval(id));
        assert!(!timers.clear_interval(id));
        assert!(timers.pop_due(now + Duration::from_secs(60)).is_empty());
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn test_ids_are_unique_across_clears() {
        let mut timers = Timers::new();
        let now = Instant::now();

        let a = timers.set_interval(Duration::from_secs(1), now);
        timers.clear_interval(a);
        let b = timers.set_interval(Duration::from_secs(1), now);
        assert_ne!(a, b);
        assert!(timers.contains(b));
        assert!(!timers.contains(a));
    }
}
