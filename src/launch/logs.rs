//! Bounded capture of worker output for diagnostics.
//!
//! The launcher pipes the worker's stderr (and stdout, once discovery is
//! done with it) through reader tasks that forward each line to `tracing`
//! and keep a bounded tail in memory, so a launch failure can attach what
//! the worker actually said before it died.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

/// Lines retained per stream; older lines are dropped.
const CAPTURE_CAPACITY: usize = 100;

/// Shared bounded buffer of captured worker output lines.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LogCapture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == CAPTURE_CAPACITY {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// The captured tail joined with newlines.
    pub(crate) fn tail(&self) -> String {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }
}

/// Spawn a task that drains `stream` line by line into `capture`.
pub(crate) fn spawn_capture<R>(stream: R, stream_name: &'static str, capture: LogCapture)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let reader = BufReader::new(stream);
        let mut lines = reader.lines();
        while let Ok(Some(text)) = lines.next_line().await {
            debug!(stream = stream_name, "worker: {}", text);
            capture.push(text);
        }
        debug!(stream = stream_name, "worker output reader exiting");
    });
}
