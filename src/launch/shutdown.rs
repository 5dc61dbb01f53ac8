//! Worker shutdown with signal escalation.
//!
//! The semanticizest worker has no shutdown RPC; stopping it means SIGTERM,
//! a bounded grace period, then SIGKILL. The process is always reaped before
//! control returns so no zombie outlives its handle.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

/// Stop a worker process, escalating to a forced kill after `grace`.
///
/// On unix the worker first gets SIGTERM and `grace` to exit on its own; a
/// worker that ignores the signal is killed forcefully. Elsewhere there is
/// no polite signal, so the kill is immediate. A worker that already exited
/// is simply reaped.
pub(crate) async fn shutdown_child(mut child: Child, grace: Duration) -> io::Result<ExitStatus> {
    if let Some(status) = child.try_wait()? {
        return Ok(status);
    }

    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            // Exited between try_wait and the signal: just reap it.
            Err(nix::errno::Errno::ESRCH) => return child.wait().await,
            Err(e) => return Err(io::Error::other(e)),
            Ok(()) => {}
        }

        if let Ok(result) = tokio::time::timeout(grace, child.wait()).await {
            return result;
        }
        // Grace period elapsed with the worker still up: escalate.
    }

    #[cfg(not(unix))]
    let _ = grace;

    child.kill().await?;
    child.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::process::Command;

    #[tokio::test]
    #[cfg(unix)]
    async fn cooperative_worker_exits_within_grace() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();

        let started = Instant::now();
        let status = shutdown_child(child, Duration::from_secs(5)).await.unwrap();
        // sleep dies on the SIGTERM itself, well before escalation.
        assert!(!status.success());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn stubborn_worker_is_killed_after_grace() {
        // Stub that shrugs off SIGTERM; only SIGKILL can take it down.
        let child = Command::new("sh")
            .arg("-c")
            .arg("trap '' TERM; while :; do sleep 1; done")
            .spawn()
            .unwrap();

        let started = Instant::now();
        let status = shutdown_child(child, Duration::from_millis(300))
            .await
            .unwrap();
        assert!(!status.success());
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_secs(10), "kill hung");
    }

    #[tokio::test]
    async fn exited_worker_is_reaped_without_error() {
        let child = Command::new("echo").arg("done").spawn().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let status = shutdown_child(child, Duration::from_millis(100))
            .await
            .unwrap();
        assert!(status.success());
    }
}
