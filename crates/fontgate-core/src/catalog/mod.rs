//! Read-only font catalog: normalized family key -> descriptor record.
//!
//! The catalog is a blob store. Each record is the JSON encoding of a
//! `FontDescriptor`, addressed only by `normalize_family(family)`.

mod descriptor;
mod dir;
mod embedded;
pub mod import;

pub use descriptor::FontDescriptor;
pub use dir::DirCatalog;
pub use embedded::EmbeddedCatalog;

use std::borrow::Cow;

/// Failure reading or decoding a catalog record. A missing record is not an
/// error; `read_blob` returns `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The backing store could not be read.
    #[error("read catalog record {key}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },
    /// The record exists but is not a valid descriptor.
    #[error("decode catalog record {key}: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

/// Read side of the catalog. Implementations never mutate after construction.
pub trait CatalogStore: Send + Sync {
    /// Raw record bytes for a normalized key, or `None` when no family matches.
    fn read_blob(&self, key: &str) -> Result<Option<Cow<'_, [u8]>>, CatalogError>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for &T {
    fn read_blob(&self, key: &str) -> Result<Option<Cow<'_, [u8]>>, CatalogError> {
        (**self).read_blob(key)
    }
}

impl<T: CatalogStore + ?Sized> CatalogStore for Box<T> {
    fn read_blob(&self, key: &str) -> Result<Option<Cow<'_, [u8]>>, CatalogError> {
        (**self).read_blob(key)
    }
}

/// Catalog key for a family name: all spaces removed, then lowercased.
///
/// "Open Sans", "opensans" and "OPEN SANS" all map to `opensans`.
pub fn normalize_family(family: &str) -> String {
    family.replace(' ', "").to_lowercase()
}

/// Decodes a catalog record.
pub fn parse_descriptor(key: &str, bytes: &[u8]) -> Result<FontDescriptor, CatalogError> {
    serde_json::from_slice(bytes).map_err(|source| CatalogError::Decode {
        key: key.to_string(),
        source,
    })
}
