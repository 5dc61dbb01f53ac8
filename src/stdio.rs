//! Line-oriented protocol client over the worker's standard streams.
//!
//! Instead of binding an HTTP port, the worker can serve requests on stdio:
//! each request is a JSON-encoded string followed by a blank line on the
//! worker's stdin, and each response is one line of JSON on its stdout,
//! parsed with the same schema rules as the HTTP protocol.
//!
//! Unlike the HTTP [`Client`](crate::Client), this client owns the worker it
//! spawned and serializes requests: one request is in flight at a time.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::candidate::{Candidate, parse_candidates};
use crate::config::LaunchConfig;
use crate::error::{Result, SemanticizerError};
use crate::launch::shutdown::shutdown_child;

/// Client that owns a worker and talks to it over stdin/stdout.
#[derive(Debug)]
pub struct StdioClient {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    request_timeout: Duration,
    stop_grace: Duration,
    pid: Option<u32>,
    /// Set after a request timeout: the worker's late reply is still in
    /// flight, so the stream no longer lines up with requests.
    desynced: bool,
}

impl StdioClient {
    /// Spawn a worker in stdio mode.
    ///
    /// The worker is started with the model (and any extra arguments) but
    /// without `--http`, so it reads requests from stdin instead of serving
    /// a port.
    pub async fn spawn(config: &LaunchConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(SemanticizerError::launch(format!(
                "model file not found: {}",
                config.model_path.display()
            )));
        }

        let mut cmd = Command::new(&config.server_path);
        for arg in &config.extra_args {
            cmd.arg(arg);
        }
        cmd.arg(&config.model_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            SemanticizerError::launch(format!(
                "failed to spawn {}: {e}",
                config.server_path.display()
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SemanticizerError::launch("worker stdin was not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SemanticizerError::launch("worker stdout was not piped"))?;

        let pid = child.id();
        info!(pid = ?pid, "semanticizest worker started in stdio mode");

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            request_timeout: config.request_timeout,
            stop_grace: config.stop_grace,
            pid,
            desynced: false,
        })
    }

    /// Pid of the owned worker, while it is running.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Given a sentence, fetch all candidate entity links for it.
    ///
    /// Writes the JSON-encoded sentence plus a blank line, then reads one
    /// line of JSON back. Bounded by the configured request timeout; a
    /// worker that closes stdout mid-conversation is an error.
    ///
    /// The protocol is lockstep. After a [`Timeout`] the worker's late reply
    /// would be mistaken for the answer to the next request, so the client
    /// refuses further requests; [`stop`] it and spawn a fresh one.
    ///
    /// [`Timeout`]: SemanticizerError::Timeout
    /// [`stop`]: StdioClient::stop
    pub async fn all_candidates(&mut self, text: &str) -> Result<Vec<Candidate>> {
        if self.desynced {
            return Err(SemanticizerError::WorkerIo(io::Error::new(
                io::ErrorKind::InvalidData,
                "response stream out of sync after a timeout; respawn the worker",
            )));
        }
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            SemanticizerError::WorkerIo(io::Error::new(
                io::ErrorKind::NotConnected,
                "worker has been stopped",
            ))
        })?;

        let mut request = serde_json::to_string(text)
            .map_err(|e| SemanticizerError::ProtocolError(e.to_string()))?;
        request.push_str("\n\n");

        stdin.write_all(request.as_bytes()).await?;
        stdin.flush().await?;

        let read = tokio::time::timeout(self.request_timeout, self.stdout.next_line()).await;
        let line = match read {
            Ok(result) => result?,
            Err(_) => {
                self.desynced = true;
                return Err(SemanticizerError::Timeout);
            }
        };
        let line = line.ok_or_else(|| {
            SemanticizerError::WorkerIo(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "worker closed stdout",
            ))
        })?;

        parse_candidates(&line)
    }

    /// Stop the worker. Idempotent; errors are logged, never propagated.
    ///
    /// Closing stdin first gives the worker the chance to exit on EOF within
    /// the grace period before signals escalate.
    pub async fn stop(&mut self) {
        drop(self.stdin.take());
        let Some(child) = self.child.take() else {
            return;
        };
        debug!(pid = ?self.pid, "stopping stdio worker");
        match shutdown_child(child, self.stop_grace).await {
            Ok(status) => debug!(status = %status, "stdio worker stopped"),
            Err(e) => warn!(error = %e, "error while stopping stdio worker"),
        }
    }
}

impl Drop for StdioClient {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            debug!(pid = ?self.pid, "stdio client dropped with live worker, killing");
            let _ = child.start_kill();
        }
    }
}
