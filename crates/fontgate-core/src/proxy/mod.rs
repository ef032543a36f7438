//! Reverse proxy for a font-hosting service.
//!
//! Requests under `/static` go to the static-asset host with that segment
//! stripped; everything else goes to the API host. Response bodies are then
//! rewritten so absolute asset-host URLs point back at `<prefix>/static`.
//!
//! The rewrite is a literal byte replacement, not URL parsing: any text in a
//! body that equals the asset host's `scheme://host` is rewritten, wherever it
//! appears. API requests drop `Accept-Encoding` so their bodies arrive
//! uncompressed and the replacement can see them.
//!
//! A `ReverseProxy` holds only read-only configuration and its transport, so
//! one instance serves any number of concurrent requests.

mod head;
mod headers;
mod message;
mod rewrite;
mod transport;

pub use headers::Headers;
pub use message::{ProxyRequest, ProxyResponse};
pub use rewrite::{replace_all, static_mount, STATIC_SEGMENT};
pub use transport::{CurlTransport, ProxyTransport};

use crate::cancel::CancelToken;
use crate::config::ProxyConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use url::Url;

/// Headers that reveal the client's address.
const CLIENT_ADDRESS_HEADERS: &[&str] = &["X-Forwarded-For", "Forwarded", "X-Real-IP"];

/// Connection-scoped headers that must not be forwarded (RFC 9110 §7.6.1).
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "Connection",
    "Keep-Alive",
    "Proxy-Connection",
    "TE",
    "Trailer",
    "Transfer-Encoding",
    "Upgrade",
];

/// Which upstream host a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Api,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    scheme: String,
    /// Host with explicit port, if any.
    host: String,
}

impl Target {
    pub(crate) fn parse(base: &str) -> Result<Self> {
        let url = Url::parse(base).with_context(|| format!("invalid upstream URL {:?}", base))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("upstream {:?} must be http or https", base);
        }
        let host = url
            .host_str()
            .with_context(|| format!("upstream {:?} has no host", base))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
        })
    }

    fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

pub struct ReverseProxy {
    api: Target,
    assets: Target,
    /// `scheme://host` of the asset host as it appears in bodies.
    asset_origin: Vec<u8>,
    /// What `asset_origin` is replaced with.
    local_static: Vec<u8>,
    transport: Arc<dyn ProxyTransport>,
}

impl ReverseProxy {
    pub fn new(config: &ProxyConfig, transport: Arc<dyn ProxyTransport>) -> Result<Self> {
        let api = Target::parse(&config.api_base).context("proxy.api_base")?;
        let assets = Target::parse(&config.static_base).context("proxy.static_base")?;
        let asset_origin = assets.origin().into_bytes();
        Ok(Self {
            api,
            assets,
            asset_origin,
            local_static: static_mount(&config.local_prefix).into_bytes(),
            transport,
        })
    }

    /// Proxy using libcurl with the given timeouts.
    pub fn with_curl(config: &ProxyConfig, options: crate::fetch::FetchOptions) -> Result<Self> {
        Self::new(config, Arc::new(CurlTransport::new(options)))
    }

    /// Points `req` at its upstream and strips what must not leave this host.
    pub fn direct(&self, req: &mut ProxyRequest) -> Upstream {
        let upstream = match rewrite::strip_static(&req.path) {
            Some(rest) => {
                req.path = rest.to_string();
                req.raw_path = rewrite::strip_static(&req.raw_path)
                    .unwrap_or(&req.raw_path)
                    .to_string();
                Upstream::Static
            }
            None => {
                req.headers.remove("Accept-Encoding");
                Upstream::Api
            }
        };
        if req.raw_path.is_empty() {
            req.raw_path.push('/');
        }
        if req.path.is_empty() {
            req.path.push('/');
        }

        let target = match upstream {
            Upstream::Api => &self.api,
            Upstream::Static => &self.assets,
        };
        req.scheme = target.scheme.clone();
        req.host = target.host.clone();
        req.headers.set("Host", target.host.clone());

        strip_hop_by_hop(&mut req.headers);
        for name in CLIENT_ADDRESS_HEADERS {
            req.headers.remove(name);
        }
        req.remote_addr = None;

        if !req.headers.contains("User-Agent") {
            req.headers.set("User-Agent", "");
        }
        upstream
    }

    /// Replaces asset-host URLs in the body and fixes up framing headers.
    ///
    /// `Content-Length` is recomputed when the body length changed or when the
    /// upstream framing was chunked. Use `rewrite_head_response` for HEAD.
    pub fn rewrite_response(&self, resp: &mut ProxyResponse) {
        let before = resp.body.len();
        let was_chunked = resp.headers.contains("Transfer-Encoding");
        resp.body = replace_all(&resp.body, &self.asset_origin, &self.local_static);
        strip_hop_by_hop(&mut resp.headers);
        if was_chunked || resp.body.len() != before {
            resp.headers.set("Content-Length", resp.body.len().to_string());
        }
    }

    /// HEAD counterpart of `rewrite_response`. There is no body to rewrite, so
    /// only hop-by-hop headers go; upstream's `Content-Length`, if any, stays.
    pub fn rewrite_head_response(&self, resp: &mut ProxyResponse) {
        strip_hop_by_hop(&mut resp.headers);
    }

    /// One full transaction: direct, forward, rewrite. Upstream failures and
    /// cancellation become `502 Bad Gateway`; nothing is retried.
    pub fn handle(&self, mut req: ProxyRequest, cancel: &CancelToken) -> ProxyResponse {
        let method = req.method.clone();
        let upstream = self.direct(&mut req);
        match self.transport.forward(&req, cancel) {
            Ok(mut resp) => {
                if method.eq_ignore_ascii_case("HEAD") {
                    self.rewrite_head_response(&mut resp);
                } else {
                    self.rewrite_response(&mut resp);
                }
                tracing::debug!(
                    %method,
                    ?upstream,
                    path = %req.raw_path,
                    status = resp.status,
                    "proxied"
                );
                resp
            }
            Err(e) => {
                tracing::warn!(
                    %method,
                    ?upstream,
                    url = %req.upstream_url(),
                    "proxy upstream failed: {}",
                    e
                );
                ProxyResponse::bad_gateway()
            }
        }
    }
}

/// Removes hop-by-hop headers, including any listed in `Connection`.
fn strip_hop_by_hop(headers: &mut Headers) {
    let listed: Vec<String> = headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("Connection"))
        .flat_map(|(_, v)| v.split(',').map(|s| s.trim().to_string()).collect::<Vec<_>>())
        .filter(|s| !s.is_empty())
        .collect();
    for name in listed {
        headers.remove(&name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}
