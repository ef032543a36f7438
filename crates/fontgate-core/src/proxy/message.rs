//! Proxied request and response values.

use super::Headers;
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;

/// An inbound request on its way upstream.
///
/// `path` is percent-decoded; `raw_path` is the escaped form as received and
/// is what goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub raw_path: String,
    pub query: Option<String>,
    pub headers: Headers,
    /// Peer address of the client connection, if known.
    pub remote_addr: Option<SocketAddr>,
    pub body: Vec<u8>,
}

impl ProxyRequest {
    /// Builds a request from an origin-form target such as `/css?family=Lato`.
    /// Scheme and host stay empty until the proxy picks an upstream.
    pub fn from_target(method: &str, target: &str) -> Self {
        let (raw_path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (target, None),
        };
        let raw_path = if raw_path.is_empty() { "/" } else { raw_path };
        Self {
            method: method.to_string(),
            scheme: String::new(),
            host: String::new(),
            path: decode_path(raw_path),
            raw_path: raw_path.to_string(),
            query,
            headers: Headers::new(),
            remote_addr: None,
            body: Vec::new(),
        }
    }

    /// Replaces the path, keeping `path` and `raw_path` in step.
    pub fn set_raw_path(&mut self, raw: &str) {
        let raw = if raw.is_empty() { "/" } else { raw };
        self.path = decode_path(raw);
        self.raw_path = raw.to_string();
    }

    /// Absolute URL to send upstream.
    pub fn upstream_url(&self) -> String {
        let mut url = format!("{}://{}{}", self.scheme, self.host, self.raw_path);
        if let Some(q) = &self.query {
            url.push('?');
            url.push_str(q);
        }
        url
    }
}

/// A complete upstream response; the body is fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u32,
    pub reason: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl ProxyResponse {
    pub fn new(status: u32, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Plain-text response, used for locally generated errors.
    pub fn text(status: u32, reason: &str, body: &str) -> Self {
        let mut resp = Self::new(status, reason);
        resp.headers.set("Content-Type", "text/plain; charset=utf-8");
        resp.headers.set("Content-Length", body.len().to_string());
        resp.body = body.as_bytes().to_vec();
        resp
    }

    pub fn bad_gateway() -> Self {
        Self::text(502, "Bad Gateway", "upstream request failed\n")
    }
}

fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_target_splits_query() {
        let req = ProxyRequest::from_target("GET", "/css?family=Open+Sans");
        assert_eq!(req.path, "/css");
        assert_eq!(req.query.as_deref(), Some("family=Open+Sans"));
    }

    #[test]
    fn from_target_decodes_path_but_keeps_raw() {
        let req = ProxyRequest::from_target("GET", "/static/s/open%20sans/a.ttf");
        assert_eq!(req.path, "/static/s/open sans/a.ttf");
        assert_eq!(req.raw_path, "/static/s/open%20sans/a.ttf");
    }

    #[test]
    fn set_raw_path_redecodes() {
        let mut req = ProxyRequest::from_target("GET", "/fonts/css?family=A");
        req.set_raw_path("/static/a%2Bb.ttf");
        assert_eq!(req.path, "/static/a+b.ttf");
        assert_eq!(req.query.as_deref(), Some("family=A"));
        req.set_raw_path("");
        assert_eq!(req.raw_path, "/");
    }

    #[test]
    fn empty_target_is_root() {
        let req = ProxyRequest::from_target("GET", "");
        assert_eq!(req.raw_path, "/");
    }

    #[test]
    fn upstream_url_joins_parts() {
        let mut req = ProxyRequest::from_target("GET", "/css2?family=Inter");
        req.scheme = "https".into();
        req.host = "fonts.googleapis.com".into();
        assert_eq!(
            req.upstream_url(),
            "https://fonts.googleapis.com/css2?family=Inter"
        );
    }

    #[test]
    fn bad_gateway_has_consistent_length() {
        let resp = ProxyResponse::bad_gateway();
        assert_eq!(resp.status, 502);
        assert_eq!(
            resp.headers.get("content-length"),
            Some(resp.body.len().to_string().as_str())
        );
    }
}
