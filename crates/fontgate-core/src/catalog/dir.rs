//! Catalog backed by a directory of `<key>.json` records.

use super::{CatalogError, CatalogStore};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads records written by `catalog::import::write_catalog`.
#[derive(Debug, Clone)]
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a key, or `None` if the key could escape the directory.
    fn record_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\', '\0']) || key.contains("..") {
            return None;
        }
        Some(self.root.join(format!("{}.json", key)))
    }
}

impl CatalogStore for DirCatalog {
    fn read_blob(&self, key: &str) -> Result<Option<Cow<'_, [u8]>>, CatalogError> {
        let path = match self.record_path(key) {
            Some(p) => p,
            None => return Ok(None),
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(Cow::Owned(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CatalogError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lato.json"), br#"{"family":"Lato"}"#).unwrap();
        let catalog = DirCatalog::new(dir.path());
        let blob = catalog.read_blob("lato").unwrap().unwrap();
        assert_eq!(&*blob, br#"{"family":"Lato"}"#);
    }

    #[test]
    fn missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirCatalog::new(dir.path());
        assert!(catalog.read_blob("lato").unwrap().is_none());
    }

    #[test]
    fn path_like_keys_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirCatalog::new(dir.path().join("inner"));
        fs::write(dir.path().join("secret.json"), b"{}").unwrap();
        assert!(catalog.read_blob("../secret").unwrap().is_none());
        assert!(catalog.read_blob("a/b").unwrap().is_none());
        assert!(catalog.read_blob("").unwrap().is_none());
    }
}
