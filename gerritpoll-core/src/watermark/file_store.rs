//! File-backed watermark store
//!
//! Persists the key-value surface as a small TOML document. Writes go to a
//! sibling temp file first and are moved into place with a rename, so a
//! crash mid-write leaves the previous state intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{WatermarkResult, WatermarkStore};

/// Watermark store persisted as a TOML file, one file per configured target.
#[derive(Debug)]
pub struct FileWatermarkStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileWatermarkStore {
    /// Opens a store, reading existing state from `path`.
    ///
    /// A missing file is the first-ever-poll state, not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`super::WatermarkError`] when the file exists but cannot
    /// be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> WatermarkResult<Self> {
        let path = path.into();
        let values: BTreeMap<String, String> = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, values })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> WatermarkResult<()> {
        let contents = toml::to_string(&self.values)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl WatermarkStore for FileWatermarkStore {
    fn get(&self, key: &str) -> WatermarkResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> WatermarkResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}
