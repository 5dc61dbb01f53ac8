//! Launch configuration for the semanticizest worker.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default deadline for the worker to report its bound port.
pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default grace period between SIGTERM and SIGKILL during stop.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

/// Default per-request deadline for RPC calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for launching a semanticizest worker process.
///
/// All inputs are explicit; the crate never consults the environment to
/// locate the binary or the model. See [`server_binary_in`] for the
/// conventional install layout.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Path to the semanticizest server binary.
    pub server_path: PathBuf,
    /// Path to the language model file the worker must load.
    pub model_path: PathBuf,
    /// Extra arguments appended before the model path.
    pub extra_args: Vec<String>,
    /// How long to wait for the worker to report its bound port.
    pub port_timeout: Duration,
    /// Grace period before a stuck worker is killed forcefully.
    pub stop_grace: Duration,
    /// Per-request deadline for the stdio protocol.
    pub request_timeout: Duration,
}

impl LaunchConfig {
    /// Create a configuration with default timeouts.
    pub fn new(server_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            server_path: server_path.into(),
            model_path: model_path.into(),
            extra_args: Vec::new(),
            port_timeout: DEFAULT_PORT_TIMEOUT,
            stop_grace: DEFAULT_STOP_GRACE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Append an extra argument passed to the worker before the model path.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Override the port-discovery deadline.
    #[must_use]
    pub const fn with_port_timeout(mut self, timeout: Duration) -> Self {
        self.port_timeout = timeout;
        self
    }

    /// Override the SIGTERM grace period used during stop.
    #[must_use]
    pub const fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    /// Override the per-request deadline for the stdio protocol.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Conventional path of the semanticizest binary under an install root.
///
/// Joins `<root>/bin/semanticizest`. Callers that want to resolve the root
/// from their environment (the Go toolchain convention) do so themselves and
/// pass the result in; the crate performs no implicit environment lookups.
pub fn server_binary_in(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join("bin").join("semanticizest")
}
