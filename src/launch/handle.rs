//! Client-side representation of a reachable worker endpoint.

use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, warn};
use url::Url;

use super::shutdown::shutdown_child;
use crate::config::DEFAULT_STOP_GRACE;

/// Lifecycle state of a [`ServerHandle`].
///
/// A handle is only ever observed `Ready` or `Terminated`; construction
/// never yields a partially initialized handle, and there is no transition
/// out of `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// The endpoint URL is valid and the worker was alive when last checked.
    Ready,
    /// The worker was stopped or observed dead.
    Terminated,
}

/// A running worker process or an externally supplied endpoint.
///
/// When the handle owns a subprocess (created via [`launch`]), dropping it
/// kills the worker best-effort; call [`stop`] for a graceful, bounded
/// shutdown. Handles around pre-existing endpoints (via [`connect`]) own no
/// process and `stop` only marks them terminated.
///
/// [`launch`]: fn@crate::launch
/// [`stop`]: ServerHandle::stop
/// [`connect`]: ServerHandle::connect
#[derive(Debug)]
pub struct ServerHandle {
    base_url: Url,
    child: Option<Child>,
    pid: Option<u32>,
    stop_grace: Duration,
    state: HandleState,
}

impl ServerHandle {
    pub(crate) fn from_launch(base_url: Url, child: Child, stop_grace: Duration) -> Self {
        let pid = child.id();
        Self {
            base_url,
            child: Some(child),
            pid,
            stop_grace,
            state: HandleState::Ready,
        }
    }

    /// Wrap a pre-existing endpoint that this handle does not own.
    pub fn connect(base_url: Url) -> Self {
        Self {
            base_url,
            child: None,
            pid: None,
            stop_grace: DEFAULT_STOP_GRACE,
            state: HandleState::Ready,
        }
    }

    /// Base URL of the worker endpoint. Never empty once the handle exists.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Port the worker is listening on, when the URL carries one.
    pub fn port(&self) -> Option<u16> {
        self.base_url.port()
    }

    /// Pid of the owned worker, if this handle owns one.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Whether the handle has been terminated.
    pub fn is_terminated(&self) -> bool {
        self.state == HandleState::Terminated
    }

    /// Check whether the owned worker is still running.
    ///
    /// Detecting an exited worker moves the handle to `Terminated`. Handles
    /// that own no process report liveness from their state alone.
    pub fn check_alive(&mut self) -> bool {
        if self.state == HandleState::Terminated {
            return false;
        }
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                warn!(status = %status, "worker exited unexpectedly");
                self.state = HandleState::Terminated;
                self.child = None;
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "failed to poll worker status");
                true
            }
        }
    }

    /// Stop the owned worker and mark the handle terminated.
    ///
    /// Sends SIGTERM, waits up to the configured grace period, then kills
    /// forcefully. Idempotent: calling it again (or on a handle that owns no
    /// process) is a no-op. Shutdown errors are logged, never propagated.
    pub async fn stop(&mut self) {
        self.state = HandleState::Terminated;
        let Some(child) = self.child.take() else {
            return;
        };
        debug!(pid = ?self.pid, "stopping worker");
        match shutdown_child(child, self.stop_grace).await {
            Ok(status) => debug!(status = %status, "worker stopped"),
            Err(e) => warn!(error = %e, "error while stopping worker"),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        // Best effort only: no blocking, no panics. The child is also
        // spawned with kill_on_drop as a second line of defense.
        if let Some(child) = self.child.as_mut() {
            debug!(pid = ?self.pid, "handle dropped with live worker, killing");
            let _ = child.start_kill();
        }
    }
}
