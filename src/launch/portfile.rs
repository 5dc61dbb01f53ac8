//! The port-discovery channel.
//!
//! The worker is told to bind an OS-assigned port and to write the number it
//! got (ASCII decimal, newline-terminated) to a file path we hand it. The
//! file lives in a single-use temp directory that is removed when the
//! [`PortFile`] goes out of scope, on every exit path.
//!
//! Discovery polls the file with exponential backoff under an explicit
//! deadline. There is no unbounded busy-wait: every iteration sleeps, and
//! the loop fails with a definitive error on deadline or on worker exit.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Child;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::{Result, SemanticizerError};

/// Initial poll interval; doubles up to [`POLL_MAX`].
const POLL_INITIAL: Duration = Duration::from_millis(10);
const POLL_MAX: Duration = Duration::from_millis(200);

/// A single-use discovery channel backed by a file in a scoped temp dir.
pub(crate) struct PortFile {
    dir: TempDir,
    path: PathBuf,
}

impl PortFile {
    /// Create the temp dir and reserve the port-file path inside it.
    pub(crate) fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("semanticizest-").tempdir()?;
        let path = dir.path().join("port");
        Ok(Self { dir, path })
    }

    /// Path the worker must write its bound port to.
    pub(crate) fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Wait for the worker to report its port, bounded by `deadline`.
    ///
    /// Fails fast with a `LaunchFailure` if the worker exits before writing,
    /// if the written value is not a valid port, or if the deadline passes.
    pub(crate) async fn wait_for_port(&self, deadline: Duration, child: &mut Child) -> Result<u16> {
        let start = Instant::now();
        let mut delay = POLL_INITIAL;

        loop {
            let read = self.try_read().map_err(|e| {
                SemanticizerError::launch(format!("failed to read discovery channel: {e}"))
            })?;
            if let Some(line) = read {
                let port = parse_port(&line)?;
                debug!(port, portfile = %self.path.display(), "worker reported port");
                return Ok(port);
            }

            let exited = child.try_wait().map_err(|e| {
                SemanticizerError::launch(format!("failed to poll worker status: {e}"))
            })?;
            if let Some(status) = exited {
                return Err(SemanticizerError::launch(format!(
                    "worker exited ({status}) before reporting a port"
                )));
            }

            let elapsed = start.elapsed();
            if elapsed >= deadline {
                return Err(SemanticizerError::launch(format!(
                    "worker did not report a port within {deadline:?}"
                )));
            }

            sleep(delay.min(deadline - elapsed)).await;
            delay = (delay * 2).min(POLL_MAX);
        }
    }

    /// One non-blocking read attempt.
    ///
    /// Returns `None` until a complete, newline-terminated line is present,
    /// so a partially flushed write is never parsed.
    fn try_read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match content.split_once('\n') {
                Some((line, _)) => Ok(Some(line.to_string())),
                None => Ok(None),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Consume the channel, removing the temp dir explicitly.
    pub(crate) fn cleanup(self) {
        if let Err(e) = self.dir.close() {
            debug!(error = %e, "failed to remove discovery temp dir");
        }
    }
}

/// Parse one line from the discovery channel as a port number.
fn parse_port(line: &str) -> Result<u16> {
    let trimmed = line.trim();
    match trimmed.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(SemanticizerError::launch(format!(
            "worker reported malformed port {trimmed:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;

    #[test]
    fn parse_accepts_valid_port() {
        assert_eq!(parse_port("8080").unwrap(), 8080);
        assert_eq!(parse_port("  65535 ").unwrap(), 65535);
    }

    #[test]
    fn parse_rejects_garbage() {
        for input in ["", "0", "-1", "65536", "http", "80 80"] {
            assert!(matches!(
                parse_port(input),
                Err(SemanticizerError::LaunchFailure { .. })
            ));
        }
    }

    #[test]
    fn temp_dir_is_removed_on_drop() {
        let portfile = PortFile::create().unwrap();
        let dir = portfile.dir.path().to_path_buf();
        assert!(dir.exists());
        drop(portfile);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn waits_for_complete_line() {
        let portfile = PortFile::create().unwrap();

        // No newline yet: not ready.
        std::fs::write(portfile.path(), "123").unwrap();
        assert_eq!(portfile.try_read().unwrap(), None);

        std::fs::write(portfile.path(), "12345\n").unwrap();
        assert_eq!(portfile.try_read().unwrap(), Some("12345".to_string()));
    }

    #[tokio::test]
    async fn deadline_produces_launch_failure() {
        let portfile = PortFile::create().unwrap();
        let mut child = Command::new("sleep")
            .arg("10")
            .spawn()
            .expect("failed to spawn sleep");

        let result = portfile
            .wait_for_port(Duration::from_millis(100), &mut child)
            .await;
        assert!(matches!(
            result,
            Err(SemanticizerError::LaunchFailure { .. })
        ));

        let _ = child.kill().await;
    }

    #[tokio::test]
    async fn unreadable_channel_is_launch_failure() {
        let portfile = PortFile::create().unwrap();
        // A directory where the port file should be makes every read fail.
        std::fs::create_dir(portfile.path()).unwrap();
        let mut child = Command::new("sleep")
            .arg("10")
            .spawn()
            .expect("failed to spawn sleep");

        let result = portfile
            .wait_for_port(Duration::from_secs(5), &mut child)
            .await;
        assert!(matches!(
            result,
            Err(SemanticizerError::LaunchFailure { .. })
        ));

        let _ = child.kill().await;
    }

    #[tokio::test]
    async fn worker_exit_fails_fast() {
        let portfile = PortFile::create().unwrap();
        let mut child = Command::new("true").spawn().expect("failed to spawn");

        let started = std::time::Instant::now();
        let result = portfile
            .wait_for_port(Duration::from_secs(30), &mut child)
            .await;
        assert!(matches!(
            result,
            Err(SemanticizerError::LaunchFailure { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
