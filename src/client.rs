//! HTTP RPC client for the semanticizest REST endpoint.
//!
//! The server exposes a single method: POST the input text to `/all` as a
//! JSON-encoded string and get back a JSON array of candidate links. The
//! client is stateless and cheap to clone; any number of clients may share
//! one worker's URL concurrently.
//!
//! No retries are performed here. A failed attempt surfaces immediately and
//! the caller decides on retry policy, which is why transport, server, and
//! protocol failures are distinct variants.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::candidate::{Candidate, parse_candidates};
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{Result, SemanticizerError};
use crate::launch::ServerHandle;

/// Client for a running semanticizest REST endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: Url,
}

impl Client {
    /// Create a client for the given base URL with the default deadline.
    pub fn new(base_url: &Url) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with a custom per-request deadline.
    pub fn with_timeout(base_url: &Url, timeout: Duration) -> Result<Self> {
        let endpoint = base_url.join("all")?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SemanticizerError::TransportFailure)?;
        Ok(Self { http, endpoint })
    }

    /// Create a client against a handle's endpoint.
    pub fn for_handle(handle: &ServerHandle) -> Result<Self> {
        Self::new(handle.base_url())
    }

    /// Given a sentence, fetch all candidate entity links for it.
    ///
    /// Returns the candidates in the order the server sent them; no ordering
    /// beyond that is guaranteed. An empty or `null` response means "no
    /// candidates" and is not an error.
    pub async fn all_candidates(&self, text: &str) -> Result<Vec<Candidate>> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(text)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest)?;

        if !status.is_success() {
            return Err(SemanticizerError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        parse_candidates(&body)
    }

    /// Like [`all_candidates`], but abortable via a cancellation token.
    ///
    /// When the token fires, the in-flight request is dropped and the call
    /// returns [`SemanticizerError::Cancelled`] instead of hanging until the
    /// deadline.
    ///
    /// [`all_candidates`]: Client::all_candidates
    pub async fn all_candidates_cancellable(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>> {
        tokio::select! {
            () = cancel.cancelled() => Err(SemanticizerError::Cancelled),
            result = self.all_candidates(text) => result,
        }
    }
}

/// Map reqwest failures onto the error taxonomy.
fn map_reqwest(e: reqwest::Error) -> SemanticizerError {
    if e.is_timeout() {
        SemanticizerError::Timeout
    } else {
        SemanticizerError::TransportFailure(e)
    }
}
