//! `fontgate import-catalog <source> --out <dir>`: build a directory catalog
//! from a provider listing, read from a file or fetched over HTTP.

use anyhow::{Context, Result};
use fontgate_core::cancel::CancelToken;
use fontgate_core::catalog::import::{self, WEBFONTS_LIST_URL};
use fontgate_core::fetch::{CurlFetcher, FetchOptions, Fetcher};
use std::path::{Path, PathBuf};

/// Environment variable holding the developer API key for listing URLs.
pub const API_KEY_ENV: &str = "GOOGLE_FONTS_API_KEY";

pub async fn run_import_catalog(
    source: Option<&str>,
    out: &Path,
    options: FetchOptions,
) -> Result<()> {
    let source = source.unwrap_or(WEBFONTS_LIST_URL).to_string();
    let out: PathBuf = out.to_path_buf();
    let written = tokio::task::spawn_blocking(move || -> Result<usize> {
        let bytes = if is_url(&source) {
            let url = with_api_key(&source, std::env::var(API_KEY_ENV).ok().as_deref());
            tracing::info!("fetching font listing from {}", source);
            let cancel = CancelToken::with_timeout(options.timeout);
            CurlFetcher::new(options)
                .fetch(&url, &cancel)
                .with_context(|| format!("fetch {}", source))?
        } else {
            std::fs::read(&source).with_context(|| format!("read {}", source))?
        };
        let listing = import::parse_listing(&bytes)?;
        import::write_catalog(&listing, &out)
    })
    .await
    .context("import worker failed")??;

    println!("Wrote {} catalog records.", written);
    Ok(())
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Appends `key=<api key>` unless the URL already carries one.
fn with_api_key(url: &str, key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() && !url.contains("key=") => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}key={}", url, sep, key)
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_appended_once() {
        assert_eq!(
            with_api_key(WEBFONTS_LIST_URL, Some("abc")),
            format!("{}?key=abc", WEBFONTS_LIST_URL)
        );
        assert_eq!(
            with_api_key("https://x.test/list?sort=alpha", Some("abc")),
            "https://x.test/list?sort=alpha&key=abc"
        );
        assert_eq!(
            with_api_key("https://x.test/list?key=zzz", Some("abc")),
            "https://x.test/list?key=zzz"
        );
        assert_eq!(with_api_key("https://x.test/list", None), "https://x.test/list");
    }

    #[tokio::test]
    async fn imports_listing_file() {
        let dir = tempfile::tempdir().unwrap();
        let listing = dir.path().join("webfonts.json");
        std::fs::write(
            &listing,
            r#"{"kind": "webfonts#webfontList", "items": [
                {"family": "Fira Code", "files": {"regular": "https://x.test/a.ttf"}}
            ]}"#,
        )
        .unwrap();
        let out = dir.path().join("catalog");
        run_import_catalog(
            Some(listing.to_str().unwrap()),
            &out,
            FetchOptions::default(),
        )
        .await
        .unwrap();
        assert!(out.join("firacode.json").is_file());
    }
}
