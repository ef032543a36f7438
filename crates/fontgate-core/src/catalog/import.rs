//! Build a directory catalog from a provider listing.
//!
//! The listing is the webfonts API response: `{"kind": "...", "items": [...]}`
//! where each item is a descriptor record. Each item is written to
//! `<dir>/<normalized family>.json`, ready for `DirCatalog`.

use super::{normalize_family, FontDescriptor};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Listing endpoint of the Google Fonts developer API.
pub const WEBFONTS_LIST_URL: &str = "https://www.googleapis.com/webfonts/v1/webfonts";

/// A decoded listing. Every item is checked against `FontDescriptor` but kept
/// verbatim, so provider fields the descriptor does not model survive import.
#[derive(Debug)]
pub struct FontListing {
    pub kind: Option<String>,
    pub items: Vec<ListingItem>,
}

#[derive(Debug)]
pub struct ListingItem {
    pub descriptor: FontDescriptor,
    /// The item exactly as listed.
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
struct RawListing {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

pub fn parse_listing(bytes: &[u8]) -> Result<FontListing> {
    let listing: RawListing = serde_json::from_slice(bytes).context("decode font listing")?;
    let items = listing
        .items
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let descriptor = FontDescriptor::deserialize(&raw)
                .with_context(|| format!("decode listing item {}", i))?;
            Ok(ListingItem { descriptor, raw })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(FontListing {
        kind: listing.kind,
        items,
    })
}

/// Writes one record per family into `dir` (created if missing).
/// Returns the number of records written.
pub fn write_catalog(listing: &FontListing, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut written = 0;
    for item in &listing.items {
        let font = &item.descriptor;
        let key = normalize_family(&font.family);
        if key.is_empty() {
            tracing::warn!("skipping listing item with empty family name");
            continue;
        }
        let path = dir.join(format!("{}.json", key));
        let json = serde_json::to_vec(&item.raw)
            .with_context(|| format!("encode {}", font.family))?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        tracing::debug!(family = %font.family, "wrote {}", path.display());
        written += 1;
    }
    Ok(written)
}
