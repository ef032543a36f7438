//! Upstream fetch error.

/// Failure of a single upstream request. Never retried by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be built (bad URL, handle setup).
    #[error("build request: {0}")]
    Request(#[source] curl::Error),
    /// Curl reported a transport failure (DNS, connect, TLS, timeout, read).
    #[error("transport: {0}")]
    Transport(#[source] curl::Error),
    /// Upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {0}")]
    Status(u32),
    /// The caller's token fired before or during the transfer.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
