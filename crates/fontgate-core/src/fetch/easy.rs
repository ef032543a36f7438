//! libcurl easy-handle fetcher.

use super::{FetchError, FetchOptions, Fetcher};
use crate::cancel::CancelToken;
use curl::easy::Easy;
use std::time::{Duration, Instant};

/// Longest timeout handed to libcurl, which stores it in milliseconds.
const MAX_CURL_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// GETs a URL with libcurl, following redirects.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: FetchOptions,
}

impl CurlFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, cancel: &CancelToken) -> Result<Vec<u8>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let mut body = Vec::new();
        let mut easy = Easy::new();
        easy.url(url).map_err(FetchError::Request)?;
        easy.follow_location(true).map_err(FetchError::Request)?;
        easy.max_redirections(10).map_err(FetchError::Request)?;
        apply_options(&mut easy, &self.options, cancel)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(FetchError::Request)?;
            transfer
                .progress_function(|_, _, _, _| !cancel.is_cancelled())
                .map_err(FetchError::Request)?;
            transfer.perform().map_err(|e| perform_error(e, cancel))?;
        }

        let code = easy.response_code().map_err(FetchError::Transport)?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Status(code));
        }
        tracing::debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

/// Timeouts plus the progress hook used for cancellation. The overall
/// timeout is clamped to the token's deadline when that is sooner.
pub(crate) fn apply_options(
    easy: &mut Easy,
    options: &FetchOptions,
    cancel: &CancelToken,
) -> Result<(), FetchError> {
    let mut timeout = options.timeout.min(MAX_CURL_TIMEOUT);
    if let Some(deadline) = cancel.deadline() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining < timeout {
            timeout = remaining;
        }
    }
    easy.connect_timeout(options.connect_timeout.min(MAX_CURL_TIMEOUT))
        .map_err(FetchError::Request)?;
    // Zero means "no timeout" to libcurl; the progress hook still sees the deadline.
    if !timeout.is_zero() {
        easy.timeout(timeout).map_err(FetchError::Request)?;
    }
    easy.progress(true).map_err(FetchError::Request)?;
    Ok(())
}

/// Classifies a failed `perform`: aborts caused by the token are cancellations.
pub(crate) fn perform_error(e: curl::Error, cancel: &CancelToken) -> FetchError {
    if e.is_aborted_by_callback() || cancel.is_cancelled() {
        FetchError::Cancelled
    } else {
        FetchError::Transport(e)
    }
}
