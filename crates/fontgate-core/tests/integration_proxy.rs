//! Integration test: reverse proxy over curl against two local upstreams
//! standing in for the API host and the static-asset host.

mod common;

use common::upstream_server::{self, Route, UpstreamServer};
use fontgate_core::cancel::CancelToken;
use fontgate_core::config::ProxyConfig;
use fontgate_core::fetch::FetchOptions;
use fontgate_core::proxy::{ProxyRequest, ProxyResponse, ReverseProxy};
use std::collections::HashMap;
use std::time::{Duration, Instant};

struct Upstreams {
    api: UpstreamServer,
    assets: UpstreamServer,
}

fn start_upstreams() -> Upstreams {
    let assets = {
        let mut routes = HashMap::new();
        routes.insert(
            "/s/lato/v24/a.woff2".to_string(),
            Route::ok("font/woff2", vec![0x77, 0x4f, 0x46, 0x32, 0, 1, 2, 3]),
        );
        upstream_server::start(routes, None)
    };
    let css = format!(
        "@font-face {{\n  font-family: 'Lato';\n  src: url({0}/s/lato/v24/a.woff2) format('woff2');\n}}\n/* {0} */\n",
        assets.base
    );
    let mut routes = HashMap::new();
    routes.insert("/css".to_string(), Route::ok("text/css; charset=utf-8", css));
    let api = upstream_server::start(routes, None);
    Upstreams { api, assets }
}

fn proxy_for(up: &Upstreams, prefix: &str) -> ReverseProxy {
    let cfg = ProxyConfig {
        api_base: up.api.base.clone(),
        static_base: up.assets.base.clone(),
        local_prefix: prefix.to_string(),
        ..ProxyConfig::default()
    };
    ReverseProxy::with_curl(
        &cfg,
        FetchOptions {
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
        },
    )
    .unwrap()
}

fn host_of(base: &str) -> &str {
    base.trim_start_matches("http://")
}

#[test]
fn css_request_is_rewritten_to_local_prefix() {
    let up = start_upstreams();
    let proxy = proxy_for(&up, "/fonts");

    let mut req = ProxyRequest::from_target("GET", "/css?family=Lato");
    req.headers.set("Accept-Encoding", "gzip, br");
    req.headers.set("X-Forwarded-For", "203.0.113.7");
    req.headers.set("Host", "example.org");
    req.remote_addr = Some("203.0.113.7:41000".parse().unwrap());

    let resp = proxy.handle(req, &CancelToken::new());
    assert_eq!(resp.status, 200);
    let body = String::from_utf8(resp.body.clone()).unwrap();
    assert!(body.contains("src: url(/fonts/static/s/lato/v24/a.woff2)"), "{}", body);
    assert!(body.contains("/* /fonts/static */"), "{}", body);
    assert!(!body.contains(&up.assets.base));
    assert_eq!(
        resp.headers.get("content-length"),
        Some(resp.body.len().to_string().as_str())
    );
    assert_eq!(resp.headers.get("content-type"), Some("text/css; charset=utf-8"));

    let seen = up.api.seen();
    assert_eq!(seen.len(), 1);
    let forwarded = &seen[0];
    assert_eq!(forwarded.target, "/css?family=Lato");
    assert!(forwarded.header("accept-encoding").is_none());
    assert!(forwarded.header("x-forwarded-for").is_none());
    assert!(forwarded.header("user-agent").is_none());
    assert_eq!(forwarded.header("host"), Some(host_of(&up.api.base)));
}

#[test]
fn static_request_goes_to_asset_host_without_prefix() {
    let up = start_upstreams();
    let proxy = proxy_for(&up, "/fonts");

    let mut req = ProxyRequest::from_target("GET", "/static/s/lato/v24/a.woff2");
    req.headers.set("User-Agent", "Mozilla/5.0 (test)");
    let resp = proxy.handle(req, &CancelToken::new());

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, vec![0x77, 0x4f, 0x46, 0x32, 0, 1, 2, 3]);
    assert_eq!(up.api.hits(), 0);
    let seen = up.assets.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].target, "/s/lato/v24/a.woff2");
    assert_eq!(seen[0].header("user-agent"), Some("Mozilla/5.0 (test)"));
    assert_eq!(seen[0].header("host"), Some(host_of(&up.assets.base)));
}

#[test]
fn upstream_status_passes_through() {
    let up = start_upstreams();
    let proxy = proxy_for(&up, "/fonts");
    let resp = proxy.handle(
        ProxyRequest::from_target("GET", "/no-such-endpoint"),
        &CancelToken::new(),
    );
    assert_eq!(resp.status, 404);
}

#[test]
fn unreachable_upstream_is_bad_gateway() {
    let cfg = ProxyConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        static_base: "http://127.0.0.1:1".to_string(),
        ..ProxyConfig::default()
    };
    let proxy = ReverseProxy::with_curl(
        &cfg,
        FetchOptions {
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
        },
    )
    .unwrap();
    let resp = proxy.handle(ProxyRequest::from_target("GET", "/css"), &CancelToken::new());
    assert_eq!(resp.status, 502);
}

#[test]
fn cancel_during_proxied_request_is_bad_gateway() {
    let mut routes = HashMap::new();
    routes.insert(
        "/css".to_string(),
        Route::ok("text/css", "@font-face { src: url(x.woff2); }"),
    );
    let api = upstream_server::start(routes, Some(Duration::from_secs(5)));
    let cfg = ProxyConfig {
        api_base: api.base.clone(),
        ..ProxyConfig::default()
    };
    let proxy = ReverseProxy::with_curl(&cfg, FetchOptions::default()).unwrap();

    let token = CancelToken::new();
    let canceller = token.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        canceller.cancel();
    });

    let started = Instant::now();
    let resp = proxy.handle(ProxyRequest::from_target("GET", "/css?family=Lato"), &token);
    handle.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
    assert_eq!(resp, ProxyResponse::bad_gateway());
    assert_eq!(api.hits(), 1);
}

#[test]
fn request_deadline_is_bad_gateway() {
    let api = upstream_server::start(HashMap::new(), Some(Duration::from_secs(5)));
    let cfg = ProxyConfig {
        api_base: api.base.clone(),
        ..ProxyConfig::default()
    };
    let proxy = ReverseProxy::with_curl(&cfg, FetchOptions::default()).unwrap();

    let started = Instant::now();
    let resp = proxy.handle(
        ProxyRequest::from_target("GET", "/css"),
        &CancelToken::with_timeout(Duration::from_millis(300)),
    );
    assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
    assert_eq!(resp, ProxyResponse::bad_gateway());
}
