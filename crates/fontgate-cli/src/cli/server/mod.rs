//! HTTP front end for `fontgate serve`.
//!
//! Routes:
//! - `GET /families/<family>`: descriptor as JSON.
//! - `GET /files/<family>/<variant>`: font bytes via the resolver and cache.
//! - anything under the mount prefix: reverse proxy, prefix stripped.
//!
//! Resolver and proxy calls block on curl, so each request runs on the
//! blocking pool with its own `CancelToken`.

mod http;


use super::app::Resolver;
use anyhow::{Context, Result};
use fontgate_core::cache::FontCache;
use fontgate_core::cancel::CancelToken;
use fontgate_core::proxy::{ProxyRequest, ProxyResponse, ReverseProxy};
use fontgate_core::FontError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};

pub struct Frontend {
    resolver: Resolver,
    cache: Arc<dyn FontCache>,
    proxy: ReverseProxy,
    /// Normalized mount point: empty for `/`, otherwise `/x` with no trailing slash.
    mount: String,
    request_timeout: Duration,
}

impl Frontend {
    pub fn new(
        resolver: Resolver,
        cache: Arc<dyn FontCache>,
        proxy: ReverseProxy,
        prefix: &str,
        request_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            cache,
            proxy,
            mount: normalize_mount(prefix),
            request_timeout,
        }
    }

    /// Answers one request. Blocking.
    pub fn respond(&self, mut req: ProxyRequest, cancel: &CancelToken) -> ProxyResponse {
        if let Some(rest) = req.path.strip_prefix("/files/") {
            if !is_read(&req.method) {
                return method_not_allowed();
            }
            return match rest.split_once('/') {
                Some((family, variant))
                    if !family.is_empty() && !variant.is_empty() && !variant.contains('/') =>
                {
                    self.serve_file(family, variant, cancel)
                }
                _ => not_found(),
            };
        }
        if let Some(family) = req.path.strip_prefix("/families/") {
            if !is_read(&req.method) {
                return method_not_allowed();
            }
            if family.is_empty() || family.contains('/') {
                return not_found();
            }
            return self.serve_descriptor(family);
        }
        match strip_mount(&self.mount, &req.raw_path) {
            Some(rest) => {
                let rest = rest.to_string();
                req.set_raw_path(&rest);
                self.proxy.handle(req, cancel)
            }
            None => not_found(),
        }
    }

    fn serve_file(&self, family: &str, variant: &str, cancel: &CancelToken) -> ProxyResponse {
        match self.resolver.variant_bytes(family, variant, self.cache.as_ref(), cancel) {
            Ok(bytes) => {
                let mut resp = ProxyResponse::new(200, "OK");
                resp.headers.set("Content-Type", sniff_content_type(&bytes));
                resp.headers.set("Content-Length", bytes.len().to_string());
                resp.headers.set("Cache-Control", "public, max-age=31536000, immutable");
                resp.body = bytes;
                resp
            }
            Err(e) => font_error_response(&e),
        }
    }

    fn serve_descriptor(&self, family: &str) -> ProxyResponse {
        let descriptor = match self.resolver.descriptor(family) {
            Ok(d) => d,
            Err(e) => return font_error_response(&e),
        };
        match serde_json::to_vec_pretty(&descriptor) {
            Ok(body) => {
                let mut resp = ProxyResponse::new(200, "OK");
                resp.headers.set("Content-Type", "application/json");
                resp.headers.set("Content-Length", body.len().to_string());
                resp.body = body;
                resp
            }
            Err(e) => {
                tracing::error!(family, "encode descriptor: {}", e);
                ProxyResponse::text(500, "Internal Server Error", "encode failed\n")
            }
        }
    }
}

/// Accepts connections until the listener fails. One request per connection.
pub async fn serve(frontend: Arc<Frontend>, listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("accept connection")?;
        let frontend = Arc::clone(&frontend);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(frontend, stream, peer).await {
                tracing::debug!(%peer, "connection ended: {:#}", e);
            }
        });
    }
}

async fn handle_connection(
    frontend: Arc<Frontend>,
    stream: TcpStream,
    peer: SocketAddr,
) -> Result<()> {
    let (mut reader, mut writer) = stream.into_split();
    let req = match http::read_request(&mut reader, Some(peer)).await {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(%peer, "bad request: {:#}", e);
            let resp = ProxyResponse::text(400, "Bad Request", "malformed request\n");
            return http::write_response(&mut writer, &resp, false).await;
        }
    };

    let started = Instant::now();
    let method = req.method.clone();
    let target = req.raw_path.clone();
    let head_only = method.eq_ignore_ascii_case("HEAD");
    let cancel = CancelToken::with_timeout(frontend.request_timeout);
    let watcher = tokio::spawn(cancel_on_disconnect(reader, cancel.clone()));

    let resp = {
        let frontend = Arc::clone(&frontend);
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || frontend.respond(req, &cancel))
            .await
            .context("request worker failed")?
    };
    watcher.abort();

    tracing::info!(
        %peer,
        %method,
        target = %target,
        status = resp.status,
        cancelled = cancel.is_cancelled(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    http::write_response(&mut writer, &resp, head_only).await
}

/// Cancels `cancel` when the client closes its side of the connection.
async fn cancel_on_disconnect(mut reader: OwnedReadHalf, cancel: CancelToken) {
    let mut buf = [0u8; 512];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => {
                cancel.cancel();
                return;
            }
            Ok(_) => {}
        }
    }
}

fn normalize_mount(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Path below `mount`, or `None` when `raw_path` is outside it. `/fontsx`
/// is not under `/fonts`.
fn strip_mount<'a>(mount: &str, raw_path: &'a str) -> Option<&'a str> {
    if mount.is_empty() {
        return Some(raw_path);
    }
    let rest = raw_path.strip_prefix(mount)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn is_read(method: &str) -> bool {
    method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD")
}

fn not_found() -> ProxyResponse {
    ProxyResponse::text(404, "Not Found", "not found\n")
}

fn method_not_allowed() -> ProxyResponse {
    let mut resp = ProxyResponse::text(405, "Method Not Allowed", "method not allowed\n");
    resp.headers.set("Allow", "GET, HEAD");
    resp
}

fn font_error_response(err: &FontError) -> ProxyResponse {
    match err {
        FontError::UnknownFont(_) | FontError::MissingVariant { .. } => {
            ProxyResponse::text(404, "Not Found", &format!("{}\n", err))
        }
        FontError::Fetch(e) => {
            tracing::warn!("font fetch failed: {}", e);
            ProxyResponse::bad_gateway()
        }
        FontError::Catalog(e) => {
            tracing::error!("catalog error: {}", e);
            ProxyResponse::text(500, "Internal Server Error", "catalog error\n")
        }
    }
}

/// Media type from the font file signature.
fn sniff_content_type(bytes: &[u8]) -> &'static str {
    match bytes.get(..4) {
        Some(b"wOF2") => "font/woff2",
        Some(b"wOFF") => "font/woff",
        Some(b"OTTO") => "font/otf",
        Some([0, 1, 0, 0]) | Some(b"true") => "font/ttf",
        Some(b"ttcf") => "font/collection",
        _ => "application/octet-stream",
    }
}
