//! memhud: live heap-usage overlay.
//!
//! Headless entry point. Wires the process probe and a log-backed notifier
//! into the host runtime, seeds the layout, and runs the event loop. An
//! embedding GUI would feed key and resize events through the runtime's
//! sender and draw the document; here a stdin reader stands in for the
//! keyboard, and overlay updates show up in the log at RUST_LOG=debug.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use crossbeam_channel::Sender;
use memhud_host::{HostEvent, HostRuntime, LogNotifier, ProcessProbe, Rect};
use memhud_monitor::{MonitorModule, ANCHOR_ID};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// Use mimalloc as the global allocator for reduced memory fragmentation
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memhud")
        .join("settings.json")
}

/// Feed stdin lines into the event channel: 'm' stands in for Ctrl+M,
/// 'r' for a window resize, 'q' (or EOF) shuts the host down.
fn spawn_input_thread(tx: Sender<HostEvent>) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("stdin-input".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let event = match line.trim() {
                    "m" | "M" => HostEvent::KeyDown {
                        key: 'm',
                        ctrl: true,
                    },
                    "r" => HostEvent::Resized {
                        width: 1280,
                        height: 720,
                    },
                    "q" => break,
                    "" => continue,
                    other => {
                        debug!("ignoring input {other:?}");
                        continue;
                    }
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
            let _ = tx.send(HostEvent::Shutdown);
        })
        .expect("Failed to spawn stdin input thread")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("memhud starting...");
    info!("Using mimalloc allocator");

    let mut runtime = HostRuntime::new(Arc::new(LogNotifier), Box::new(ProcessProbe::current()));
    runtime.host_mut().settings.load_from(settings_path());

    // Stand-in layout: the container the overlay pins itself above
    runtime
        .host_mut()
        .document
        .set_container(ANCHOR_ID, Rect::new(12.0, 640.0, 240.0, 120.0));

    runtime.register_module(Box::new(MonitorModule::new()));
    runtime.start();

    let input = spawn_input_thread(runtime.sender());
    info!("type 'm' + Enter to toggle the monitor, 'q' + Enter to quit");

    runtime.run();
    drop(runtime);
    let _ = input.join();

    info!("memhud shutting down");
    Ok(())
}
