//! Process-table liveness probe.

use sysinfo::{Pid, ProcessStatus, System};

/// Check whether a process with the given pid is alive.
///
/// Zombies count as dead: a worker that exited but has not been reaped is
/// no longer serving requests.
pub fn process_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes(sysinfo::ProcessesToUpdate::All, false);

    system.process(Pid::from_u32(pid)).is_some_and(|process| {
        matches!(
            process.status(),
            ProcessStatus::Run | ProcessStatus::Sleep | ProcessStatus::Idle
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_alive() {
        assert!(process_alive(std::process::id()));
    }

    #[test]
    fn bogus_pid_is_dead() {
        // Pid values near the top of the range are vanishingly unlikely to
        // be allocated on test machines.
        assert!(!process_alive(u32::MAX - 7));
    }
}
