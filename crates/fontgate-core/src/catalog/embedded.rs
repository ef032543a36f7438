//! Catalog records compiled into the binary.

use super::{CatalogError, CatalogStore};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

macro_rules! bundled {
    ($($key:literal),* $(,)?) => {
        &[$(($key, include_str!(concat!("../../catalog/", $key, ".json")))),*]
    };
}

/// (normalized key, JSON record) for every bundled family.
static RECORDS: &[(&str, &str)] = bundled![
    "inter",
    "lato",
    "merriweather",
    "opensans",
    "playfairdisplay",
    "roboto",
    "sourcecodepro",
];

fn table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| RECORDS.iter().copied().collect())
}

/// The bundled catalog. Built once per process on first lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

impl EmbeddedCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Normalized keys of every bundled family, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = table().keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl CatalogStore for EmbeddedCatalog {
    fn read_blob(&self, key: &str) -> Result<Option<Cow<'_, [u8]>>, CatalogError> {
        Ok(table().get(key).map(|s| Cow::Borrowed(s.as_bytes())))
    }
}
