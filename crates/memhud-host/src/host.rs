//! Host runtime: service bundle, module lifecycle, and the event loop.
//!
//! All events are delivered on one thread, one at a time. Modules receive
//! two one-shot lifecycle signals (`setup`, then `ready`) before any event
//! reaches them.

use crate::document::Document;
use crate::event::HostEvent;
use crate::notify::Notifier;
use crate::probe::{HeapSample, MemoryProbe};
use crate::settings::SettingsStore;
use crate::timers::{TimerId, Timers};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long the loop sleeps when no interval is armed
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Token held by a widget interested in window-resize events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Watch({})", self.0)
    }
}

/// The services a module sees in every callback.
pub struct Host {
    pub document: Document,
    pub settings: SettingsStore,
    pub timers: Timers,
    notifier: Arc<dyn Notifier>,
    probe: Box<dyn MemoryProbe>,
    events: Sender<HostEvent>,
    resize_watches: HashSet<WatchId>,
    next_watch: u64,
}

impl Host {
    fn new(notifier: Arc<dyn Notifier>, probe: Box<dyn MemoryProbe>, events: Sender<HostEvent>) -> Self {
        Self {
            document: Document::new(),
            settings: SettingsStore::new(events.clone()),
            timers: Timers::new(),
            notifier,
            probe,
            events,
            resize_watches: HashSet::new(),
            next_watch: 0,
        }
    }

    /// Raise a user-visible warning.
    pub fn warn_user(&self, message: &str) {
        self.notifier.warn(message);
    }

    /// Read the heap counter, if this environment has one.
    pub fn sample_heap(&mut self) -> Option<HeapSample> {
        self.probe.sample()
    }

    /// Register a repeating interval, delivered as `HostEvent::Timer`.
    pub fn set_interval(&mut self, period: Duration) -> TimerId {
        self.timers.set_interval(period, Instant::now())
    }

    pub fn clear_interval(&mut self, id: TimerId) -> bool {
        self.timers.clear_interval(id)
    }

    /// Declare interest in `Resized` events. The token is an owned
    /// resource; release it with `unwatch_resize` on teardown.
    pub fn watch_resize(&mut self) -> WatchId {
        self.next_watch += 1;
        let id = WatchId(self.next_watch);
        self.resize_watches.insert(id);
        id
    }

    pub fn unwatch_resize(&mut self, id: WatchId) -> bool {
        self.resize_watches.remove(&id)
    }

    pub fn resize_watch_count(&self) -> usize {
        self.resize_watches.len()
    }

    /// Queue an event for delivery on the next pump.
    pub fn post(&self, event: HostEvent) {
        let _ = self.events.send(event);
    }
}

/// A unit of host-integrated functionality.
pub trait Module {
    /// Configuration phase: register settings. Fired exactly once, before
    /// `ready` and before any event.
    fn setup(&mut self, _host: &mut Host) {}

    /// Ready phase: the layout is in place. Fired exactly once.
    fn ready(&mut self, _host: &mut Host) {}

    /// Sequential event delivery.
    fn handle_event(&mut self, _host: &mut Host, _event: &HostEvent) {}
}

/// Owns the host services, the registered modules, and the event channel.
pub struct HostRuntime {
    host: Host,
    modules: Vec<Box<dyn Module>>,
    rx: Receiver<HostEvent>,
    started: bool,
    shutdown: bool,
}

impl HostRuntime {
    pub fn new(notifier: Arc<dyn Notifier>, probe: Box<dyn MemoryProbe>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            host: Host::new(notifier, probe, tx),
            modules: Vec::new(),
            rx,
            started: false,
            shutdown: false,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// Sender half of the event channel, for embedders feeding input from
    /// another thread.
    pub fn sender(&self) -> Sender<HostEvent> {
        self.host.events.clone()
    }

    pub fn register_module(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    /// Fire the configuration and ready phases. Safe to call again; the
    /// signals only ever fire once.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!("host starting with {} modules", self.modules.len());

        let Self { host, modules, .. } = self;
        for module in modules.iter_mut() {
            module.setup(host);
        }
        for module in modules.iter_mut() {
            module.ready(host);
        }
        self.pump();
    }

    /// Deliver one event to every module, then drain whatever the delivery
    /// queued (e.g. setting changes made by a key handler).
    pub fn dispatch(&mut self, event: HostEvent) {
        self.deliver(&event);
        self.pump();
    }

    /// Drain queued events without blocking.
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.deliver(&event);
        }
    }

    /// Fire any intervals due at `now` as `Timer` events.
    pub fn tick(&mut self, now: Instant) {
        for id in self.host.timers.pop_due(now) {
            self.deliver(&HostEvent::Timer(id));
        }
        self.pump();
    }

    /// Run the event loop until `Shutdown` is delivered.
    pub fn run(&mut self) {
        self.start();
        info!("host event loop running");
        while !self.shutdown {
            let timeout = self
                .host
                .timers
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_WAIT);

            match self.rx.recv_timeout(timeout) {
                Ok(event) => {
                    self.deliver(&event);
                    self.pump();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.tick(Instant::now());
        }
        info!("host event loop stopped");
    }

    fn deliver(&mut self, event: &HostEvent) {
        debug!("dispatching {event:?}");
        if matches!(event, HostEvent::Shutdown) {
            self.shutdown = true;
        }
        let Self { host, modules, .. } = self;
        for module in modules.iter_mut() {
            module.handle_event(host, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingScope, SettingSpec};
    use std::sync::Mutex;

    struct NullNotifier;
    impl Notifier for NullNotifier {
        fn warn(&self, _message: &str) {}
    }

    struct NullProbe;
    impl MemoryProbe for NullProbe {
        fn sample(&mut self) -> Option<HeapSample> {
            None
        }
    }

    /// Records every callback it receives.
    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
        toggles: bool,
    }

    impl Module for Recorder {
        fn setup(&mut self, host: &mut Host) {
            self.log.lock().unwrap().push("setup".to_string());
            host.settings.register(SettingSpec {
                namespace: "test".to_string(),
                key: "flag".to_string(),
                name: "Flag".to_string(),
                hint: String::new(),
                scope: SettingScope::Client,
                default: false,
                show_in_config: false,
            });
        }

        fn ready(&mut self, _host: &mut Host) {
            self.log.lock().unwrap().push("ready".to_string());
        }

        fn handle_event(&mut self, host: &mut Host, event: &HostEvent) {
            self.log.lock().unwrap().push(format!("{event:?}"));
            if self.toggles {
                if let HostEvent::KeyDown { key: 't', .. } = event {
                    let current = host.settings.get_bool("test", "flag").unwrap();
                    host.settings.set_bool("test", "flag", !current).unwrap();
                }
            }
        }
    }

    fn runtime_with_recorder(toggles: bool) -> (HostRuntime, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runtime = HostRuntime::new(Arc::new(NullNotifier), Box::new(NullProbe));
        runtime.register_module(Box::new(Recorder {
            log: log.clone(),
            toggles,
        }));
        (runtime, log)
    }

    #[test]
    fn test_lifecycle_signals_fire_once() {
        let (mut runtime, log) = runtime_with_recorder(false);
        runtime.start();
        runtime.start();

        let log = log.lock().unwrap();
        assert_eq!(log.as_slice(), ["setup", "ready"]);
    }

    #[test]
    fn test_dispatch_reaches_modules() {
        let (mut runtime, log) = runtime_with_recorder(false);
        runtime.start();
        runtime.dispatch(HostEvent::Resized {
            width: 800,
            height: 600,
        });

        assert!(log.lock().unwrap().iter().any(|e| e.contains("Resized")));
    }

    #[test]
    fn test_nested_setting_change_is_drained() {
        let (mut runtime, log) = runtime_with_recorder(true);
        runtime.start();
        runtime.dispatch(HostEvent::KeyDown {
            key: 't',
            ctrl: true,
        });

        // The key handler flipped the setting; the resulting change event
        // was delivered within the same dispatch.
        assert!(runtime.host().settings.get_bool("test", "flag").unwrap());
        assert!(log.lock().unwrap().iter().any(|e| e.contains("SettingChanged")));
    }

    #[test]
    fn test_due_intervals_fire_as_events() {
        let (mut runtime, log) = runtime_with_recorder(false);
        runtime.start();

        let id = runtime.host_mut().set_interval(Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(10));
        runtime.tick(Instant::now());
        assert!(log.lock().unwrap().iter().any(|e| e.contains("Timer")));

        runtime.host_mut().clear_interval(id);
        log.lock().unwrap().clear();
        std::thread::sleep(Duration::from_millis(10));
        runtime.tick(Instant::now());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_resize_watch_tokens() {
        let (mut runtime, _log) = runtime_with_recorder(false);
        let host = runtime.host_mut();

        let a = host.watch_resize();
        let b = host.watch_resize();
        assert_ne!(a, b);
        assert_eq!(host.resize_watch_count(), 2);

        assert!(host.unwatch_resize(a));
        assert!(!host.unwatch_resize(a));
        assert_eq!(host.resize_watch_count(), 1);
    }
}
