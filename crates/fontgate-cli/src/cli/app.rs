//! Resolver, cache and proxy built from the loaded config.

use anyhow::Result;
use fontgate_core::cache::{DirCache, FontCache, MemoryCache, NoCache};
use fontgate_core::catalog::{CatalogStore, DirCatalog, EmbeddedCatalog};
use fontgate_core::config::{CacheBackend, FontgateConfig};
use fontgate_core::fetch::CurlFetcher;
use fontgate_core::FontResolver;
use std::sync::Arc;

pub type Resolver = FontResolver<Box<dyn CatalogStore>>;

pub fn build_resolver(cfg: &FontgateConfig) -> Resolver {
    let catalog: Box<dyn CatalogStore> = match &cfg.catalog_dir {
        Some(dir) => {
            tracing::debug!("using catalog dir {}", dir.display());
            Box::new(DirCatalog::new(dir))
        }
        None => Box::new(EmbeddedCatalog::new()),
    };
    let fetcher = CurlFetcher::new(cfg.fetch.options());
    FontResolver::new(catalog, Arc::new(fetcher))
}

pub fn build_cache(cfg: &FontgateConfig) -> Result<Arc<dyn FontCache>> {
    Ok(match cfg.cache.backend {
        CacheBackend::None => Arc::new(NoCache),
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Disk => {
            let dir = match &cfg.cache.dir {
                Some(dir) => dir.clone(),
                None => DirCache::default_dir()?,
            };
            tracing::debug!("using disk cache at {}", dir.display());
            Arc::new(DirCache::new(dir))
        }
    })
}

/// Extension of the last path segment of `url`, without query or fragment.
pub fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next()?;
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}
