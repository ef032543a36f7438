//! `fontgate fetch <family> <variant>`: download one font file.

use crate::cli::app::{url_extension, Resolver};
use anyhow::{Context, Result};
use fontgate_core::cache::FontCache;
use fontgate_core::cancel::CancelToken;
use fontgate_core::{normalize_family, FontDescriptor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Writes the variant to `output`, or to `<key>-<variant>.<ext>` in the
/// current directory.
pub async fn run_fetch(
    resolver: Arc<Resolver>,
    cache: Arc<dyn FontCache>,
    family: &str,
    variant: &str,
    output: Option<&Path>,
    timeout: Duration,
) -> Result<()> {
    let descriptor = resolver.descriptor(family)?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_file_name(&descriptor, variant),
    };

    let bytes = {
        let family = family.to_string();
        let variant = variant.to_string();
        tokio::task::spawn_blocking(move || {
            let cancel = CancelToken::with_timeout(timeout);
            resolver.variant_bytes(&family, &variant, cache.as_ref(), &cancel)
        })
        .await
        .context("fetch worker failed")??
    };

    std::fs::write(&output, &bytes).with_context(|| format!("write {}", output.display()))?;
    println!("{} bytes -> {}", bytes.len(), output.display());
    Ok(())
}

fn default_file_name(descriptor: &FontDescriptor, variant: &str) -> PathBuf {
    let key = normalize_family(&descriptor.family);
    let ext = descriptor
        .variant_url(variant)
        .and_then(url_extension)
        .unwrap_or("ttf");
    PathBuf::from(format!("{}-{}.{}", key, variant, ext))
}
