//! Client and process supervisor for the semanticizest entity-linking server.
//!
//! Entity linking itself (text segmentation, n-gram lookup, probability
//! scoring) lives in the external `semanticizest` binary; this crate only
//! starts that worker, discovers the port it bound, and issues the one RPC
//! it supports: "find candidate entity links for this text".
//!
//! # Launching a worker
//!
//! ```no_run
//! use semanticizest::{Client, LaunchConfig, launch};
//!
//! # async fn run() -> semanticizest::Result<()> {
//! let config = LaunchConfig::new("/opt/semanticize/bin/semanticizest", "nl.model");
//! let mut handle = launch(&config).await?;
//!
//! let client = Client::for_handle(&handle)?;
//! for candidate in client.all_candidates("Antwerpen").await? {
//!     println!("{} @ {}", candidate.target, candidate.offset);
//! }
//!
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Connecting to an existing endpoint
//!
//! A worker started by other means is reached the same way, via
//! [`ServerHandle::connect`] or by handing [`Client::new`] its base URL
//! directly.
//!
//! # Stdio mode
//!
//! [`StdioClient`] drives the worker over stdin/stdout instead of HTTP,
//! matching the worker's line-oriented protocol.

mod candidate;
mod client;
mod config;
mod error;
mod launch;
mod stdio;

pub use candidate::Candidate;
pub use client::Client;
pub use config::{
    DEFAULT_PORT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STOP_GRACE, LaunchConfig,
    server_binary_in,
};
pub use error::{Result, SemanticizerError};
pub use launch::{HandleState, ServerHandle, launch, process_alive};
pub use stdio::StdioClient;

// Re-exported so callers don't need a direct dependency for these types.
pub use tokio_util::sync::CancellationToken;
pub use url::Url;
