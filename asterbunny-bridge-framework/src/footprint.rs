//! Process memory footprint for progress logs.

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Samples the resident memory of the current process.
pub struct MemoryProbe {
    system: System,
    pid: Option<Pid>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Resident memory in bytes, or 0 when the platform cannot report it.
    pub fn resident_bytes(&mut self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        self.system.process(pid).map(|p| p.memory()).unwrap_or(0)
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}
