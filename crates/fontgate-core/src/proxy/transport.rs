//! Sending a directed request upstream.

use super::head::{parse_response_head, ResponseHead};
use super::{Headers, ProxyRequest, ProxyResponse};
use crate::cancel::CancelToken;
use crate::fetch::{apply_options, perform_error, FetchError, FetchOptions};
use curl::easy::{Easy, List};
use std::str;

/// Performs one upstream round trip for the proxy.
pub trait ProxyTransport: Send + Sync {
    fn forward(
        &self,
        req: &ProxyRequest,
        cancel: &CancelToken,
    ) -> Result<ProxyResponse, FetchError>;
}

impl<T: ProxyTransport + ?Sized> ProxyTransport for std::sync::Arc<T> {
    fn forward(
        &self,
        req: &ProxyRequest,
        cancel: &CancelToken,
    ) -> Result<ProxyResponse, FetchError> {
        (**self).forward(req, cancel)
    }
}

/// libcurl transport. Does not follow redirects and does not decode bodies;
/// the client sees exactly what upstream sent.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: FetchOptions,
}

impl CurlTransport {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

/// Header list for curl. An empty value is sent as `Name:`, which tells curl
/// to send no such header at all; this keeps an empty `User-Agent` from being
/// replaced by anything. Curl's own `Accept` and `Expect` defaults are
/// suppressed the same way so only client headers go upstream.
fn header_list(req: &ProxyRequest) -> Result<List, curl::Error> {
    let mut list = List::new();
    for (name, value) in req.headers.iter() {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        if value.is_empty() {
            list.append(&format!("{}:", name))?;
        } else {
            list.append(&format!("{}: {}", name, value))?;
        }
    }
    if !req.headers.contains("Accept") {
        list.append("Accept:")?;
    }
    list.append("Expect:")?;
    Ok(list)
}

fn set_method(easy: &mut Easy, req: &ProxyRequest) -> Result<(), curl::Error> {
    match req.method.as_str() {
        "GET" => easy.get(true),
        "HEAD" => easy.nobody(true),
        method => {
            if !req.body.is_empty() || method == "POST" {
                easy.post(true)?;
                easy.post_fields_copy(&req.body)?;
            }
            if method != "POST" {
                easy.custom_request(method)?;
            }
            Ok(())
        }
    }
}

impl ProxyTransport for CurlTransport {
    fn forward(
        &self,
        req: &ProxyRequest,
        cancel: &CancelToken,
    ) -> Result<ProxyResponse, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let mut header_lines: Vec<String> = Vec::new();
        let mut body = Vec::new();

        let mut easy = Easy::new();
        easy.url(&req.upstream_url()).map_err(FetchError::Request)?;
        set_method(&mut easy, req).map_err(FetchError::Request)?;
        easy.http_headers(header_list(req).map_err(FetchError::Request)?)
            .map_err(FetchError::Request)?;
        apply_options(&mut easy, &self.options, cancel)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = str::from_utf8(data) {
                        header_lines.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(FetchError::Request)?;
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

        let head = match parse_response_head(&header_lines) {
            Some(head) => head,
            None => {
                let code = easy.response_code().map_err(FetchError::Transport)?;
                ResponseHead {
                    status: code,
                    reason: String::new(),
                    headers: Headers::new(),
                }
            }
        };

        Ok(ProxyResponse {
            status: head.status,
            reason: head.reason,
            headers: head.headers,
            body,
        })
    }
}
