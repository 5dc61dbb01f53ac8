//! Port-discovery launcher for the semanticizest worker.
//!
//! Launch flow: create the discovery channel, spawn the worker pointed at
//! it (`--http=:0 --portfile=<path> <model>`), wait for the worker to report
//! its bound port, compose the base URL, and hand back a [`ServerHandle`]
//! that owns the process. Any failure along the way kills the worker before
//! the error propagates, so no orphan is ever left behind.

mod handle;
mod health;
mod logs;
mod portfile;
pub(crate) mod shutdown;

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};
use url::Url;

pub use handle::{HandleState, ServerHandle};
pub use health::process_alive;

use crate::config::LaunchConfig;
use crate::error::{Result, SemanticizerError};
use logs::{LogCapture, spawn_capture};
use portfile::PortFile;
use shutdown::shutdown_child;

/// Grace period for killing a worker that already failed to launch.
const FAILED_LAUNCH_GRACE: Duration = Duration::from_millis(100);

/// Launch a semanticizest worker and discover its bound port.
///
/// Returns a handle that is fully `Ready`: the URL is valid and the worker
/// was alive when the port was read. On any failure the worker is killed
/// and reaped before the error is returned, with captured stderr attached
/// when the worker produced any.
pub async fn launch(config: &LaunchConfig) -> Result<ServerHandle> {
    if !config.model_path.exists() {
        return Err(SemanticizerError::launch(format!(
            "model file not found: {}",
            config.model_path.display()
        )));
    }

    let portfile = PortFile::create().map_err(|e| {
        SemanticizerError::launch(format!("failed to create discovery channel: {e}"))
    })?;

    let mut cmd = Command::new(&config.server_path);
    cmd.arg("--http=:0")
        .arg(format!("--portfile={}", portfile.path().display()));
    for arg in &config.extra_args {
        cmd.arg(arg);
    }
    cmd.arg(&config.model_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
        SemanticizerError::launch(format!(
            "failed to spawn {}: {e}",
            config.server_path.display()
        ))
    })?;

    let stderr_capture = LogCapture::new();
    if let Some(stderr) = child.stderr.take() {
        spawn_capture(stderr, "stderr", stderr_capture.clone());
    }
    if let Some(stdout) = child.stdout.take() {
        spawn_capture(stdout, "stdout", LogCapture::new());
    }

    let port = match portfile.wait_for_port(config.port_timeout, &mut child).await {
        Ok(port) => port,
        Err(e) => {
            kill_failed_worker(child).await;
            portfile.cleanup();
            // Give the reader tasks a moment to drain the last lines.
            tokio::time::sleep(Duration::from_millis(50)).await;
            return Err(attach_stderr(e, &stderr_capture));
        }
    };
    portfile.cleanup();

    let base_url = Url::parse(&format!("http://127.0.0.1:{port}"))?;
    info!(port, pid = ?child.id(), url = %base_url, "semanticizest worker ready");
    Ok(ServerHandle::from_launch(
        base_url,
        child,
        config.stop_grace,
    ))
}

/// Kill and reap a worker whose launch failed. Never propagates.
async fn kill_failed_worker(mut child: tokio::process::Child) {
    match child.try_wait() {
        Ok(Some(_)) => {}
        _ => {
            if let Err(e) = shutdown_child(child, FAILED_LAUNCH_GRACE).await {
                warn!(error = %e, "failed to kill worker after launch failure");
            }
        }
    }
}

fn attach_stderr(err: SemanticizerError, capture: &LogCapture) -> SemanticizerError {
    match err {
        SemanticizerError::LaunchFailure {
            message,
            stderr: None,
        } => SemanticizerError::launch_with_stderr(message, capture.tail()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_model_fails_before_spawn() {
        let config = LaunchConfig::new("/bin/true", "/nonexistent/model.file");
        let result = launch(&config).await;
        assert!(matches!(
            result,
            Err(SemanticizerError::LaunchFailure { .. })
        ));
    }

    #[tokio::test]
    async fn missing_binary_is_launch_failure() {
        let model = tempfile::NamedTempFile::new().unwrap();
        let config = LaunchConfig::new("/nonexistent/semanticizest", model.path());
        let result = launch(&config).await;
        assert!(matches!(
            result,
            Err(SemanticizerError::LaunchFailure { .. })
        ));
    }
}
