//! Upstream retrieval of font files.
//!
//! `Fetcher` is the seam between the resolver and the network: production
//! code uses `CurlFetcher`, tests substitute stubs that count or refuse calls.

mod easy;
mod error;

pub use easy::CurlFetcher;
pub use error::FetchError;

pub(crate) use easy::{apply_options, perform_error};

use crate::cancel::CancelToken;
use std::time::Duration;

/// Blocking GET of a whole resource. Implementations must honor `cancel`
/// before and during the transfer and never return a partial body.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<Vec<u8>, FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url, cancel)
    }
}

/// Timeouts applied to every curl handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Hard limit for the whole transfer.
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}
