//! Font resolution: family name -> descriptor -> variant bytes.
//!
//! Lookups go through `normalize_family`, so any casing or spacing of a
//! family name reaches the same catalog record. Variant bytes come from the
//! injected cache when present there, otherwise from the fetcher, and are then
//! written back to the cache. Concurrent misses for the same URL each fetch;
//! the last cache write wins.

use crate::cache::FontCache;
use crate::cancel::CancelToken;
use crate::catalog::{
    normalize_family, parse_descriptor, CatalogError, CatalogStore, EmbeddedCatalog,
    FontDescriptor,
};
use crate::fetch::{CurlFetcher, FetchError, Fetcher};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("unknown font: {0}")]
    UnknownFont(String),
    #[error("font {family} has no variant {variant}")]
    MissingVariant { family: String, variant: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("fetch font file: {0}")]
    Fetch(#[from] FetchError),
}

impl FontError {
    /// True for `UnknownFont` and `MissingVariant`, the conditions callers
    /// usually map to "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, FontError::UnknownFont(_) | FontError::MissingVariant { .. })
    }
}

pub struct FontResolver<C = EmbeddedCatalog> {
    catalog: C,
    fetcher: Arc<dyn Fetcher>,
}

impl FontResolver<EmbeddedCatalog> {
    /// Bundled catalog, curl fetcher with default timeouts.
    pub fn embedded() -> Self {
        Self::new(EmbeddedCatalog::new(), Arc::new(CurlFetcher::default()))
    }
}

impl<C: CatalogStore> FontResolver<C> {
    pub fn new(catalog: C, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { catalog, fetcher }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Descriptor for `family`, or `UnknownFont`. Never touches the network.
    pub fn descriptor(&self, family: &str) -> Result<FontDescriptor, FontError> {
        let key = normalize_family(family);
        let blob = self
            .catalog
            .read_blob(&key)?
            .ok_or_else(|| FontError::UnknownFont(family.to_string()))?;
        Ok(parse_descriptor(&key, &blob)?)
    }

    /// Bytes of one variant's font file, exactly as served upstream.
    ///
    /// Pass `&NoCache` to disable caching. A cache hit returns without any
    /// network call and without re-writing the entry. On a miss the file is
    /// fetched under `cancel`; only a complete, successful body is cached.
    pub fn variant_bytes(
        &self,
        family: &str,
        variant: &str,
        cache: &dyn FontCache,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, FontError> {
        let descriptor = self.descriptor(family)?;
        let url = descriptor
            .variant_url(variant)
            .ok_or_else(|| FontError::MissingVariant {
                family: descriptor.family.clone(),
                variant: variant.to_string(),
            })?;

        if let Some(cached) = cache.get(url) {
            tracing::debug!(family = %descriptor.family, variant, "cache hit");
            return Ok(cached);
        }
        tracing::debug!(family = %descriptor.family, variant, url, "cache miss, fetching");

        let bytes = self.fetcher.fetch(url, cancel).map_err(|e| {
            tracing::warn!(url, "font fetch failed: {}", e);
            e
        })?;
        cache.set(url, bytes.clone());
        Ok(bytes)
    }
}
