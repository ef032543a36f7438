//! Cache port for fetched font bytes.
//!
//! The resolver only sees `FontCache`; lifetime, eviction and failure handling
//! belong to the implementation. Keys are upstream variant URLs, so a hit is
//! shared by every family that points at the same file.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;

/// Key -> bytes store injected into `FontResolver::variant_bytes`.
///
/// `set` cannot fail from the caller's point of view: a dropped write simply
/// shows up as a later miss.
pub trait FontCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: Vec<u8>);
}

impl<T: FontCache + ?Sized> FontCache for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        (**self).set(key, value)
    }
}

/// Always misses; discards writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl FontCache for NoCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: Vec<u8>) {}
}

/// Unbounded in-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FontCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value);
        }
    }
}

/// One file per entry under a directory; file name is the SHA-256 of the key.
#[derive(Debug, Clone)]
pub struct DirCache {
    root: PathBuf,
}

impl DirCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.cache/fontgate/fonts`.
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("fontgate")?;
        Ok(xdg_dirs.get_cache_home().join("fontgate").join("fonts"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root.join(hex::encode(digest))
    }

    /// Each writer gets its own temp file, so a concurrent `set` for the
    /// same key never truncates a file another writer is about to rename.
    fn write_entry(&self, path: &Path, value: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl FontCache for DirCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        let path = self.entry_path(key);
        if let Err(e) = self.write_entry(&path, &value) {
            tracing::warn!(key, "disk cache write failed: {}", e);
        }
    }
}
