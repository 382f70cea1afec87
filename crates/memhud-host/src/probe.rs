//! Heap-usage probe capability.

use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};
use tracing::debug;

/// One reading of the heap counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapSample {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

/// Memory-usage counter exposed by the runtime environment.
///
/// `sample` returns `None` when the counter is unavailable, which callers
/// treat as a missing capability rather than a transient error.
pub trait MemoryProbe: Send {
    fn sample(&mut self) -> Option<HeapSample>;
}

/// Probe backed by the current process: used = resident set size,
/// total = installed physical memory.
pub struct ProcessProbe {
    system: System,
    pid: Pid,
}

impl ProcessProbe {
    pub fn current() -> Self {
        Self {
            system: System::new_with_specifics(RefreshKind::everything()),
            pid: Pid::from_u32(std::process::id()),
        }
    }
}

impl MemoryProbe for ProcessProbe {
    fn sample(&mut self) -> Option<HeapSample> {
        self.system.refresh_processes_specifics(
            sysinfo::ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        self.system.refresh_memory();

        let used = match self.system.process(self.pid) {
            Some(process) => process.memory(),
            None => {
                debug!("process {} not visible to sysinfo", self.pid);
                return None;
            }
        };

        Some(HeapSample {
            used_bytes: used,
            total_bytes: self.system.total_memory(),
        })
    }
}
