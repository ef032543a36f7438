//! `fontgate serve`: run the HTTP front end until interrupted.

use crate::cli::app::{build_cache, build_resolver};
use crate::cli::server::{self, Frontend};
use anyhow::{Context, Result};
use fontgate_core::config::FontgateConfig;
use fontgate_core::proxy::ReverseProxy;
use std::sync::Arc;
use tokio::net::TcpListener;

/// `listen` and `prefix` override the `[proxy]` config section.
pub async fn run_serve(
    mut cfg: FontgateConfig,
    listen: Option<String>,
    prefix: Option<String>,
) -> Result<()> {
    if let Some(listen) = listen {
        cfg.proxy.listen = listen;
    }
    if let Some(prefix) = prefix {
        cfg.proxy.local_prefix = prefix;
    }

    let proxy = ReverseProxy::with_curl(&cfg.proxy, cfg.fetch.options())?;
    let frontend = Frontend::new(
        build_resolver(&cfg),
        build_cache(&cfg)?,
        proxy,
        &cfg.proxy.local_prefix,
        cfg.fetch.request_timeout(),
    );
    let listener = TcpListener::bind(&cfg.proxy.listen)
        .await
        .with_context(|| format!("bind {}", cfg.proxy.listen))?;
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        prefix = %cfg.proxy.local_prefix,
        api = %cfg.proxy.api_base,
        assets = %cfg.proxy.static_base,
        "serving"
    );
    println!("Listening on http://{} (proxy mounted at {})", addr, cfg.proxy.local_prefix);

    tokio::select! {
        res = server::serve(Arc::new(frontend), listener) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
    }
}
