//! Named string blobs that outlive the process.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::{Error, Result};

/// JSON object of show key → assignment.
pub const ASSIGNMENTS_KEY: &str = "assignments";
/// The month label the scheduler last picked, as plain text.
pub const SELECTED_MONTH_KEY: &str = "selectedMonth";

/// Key-value persistence for whole blobs.
pub trait BlobStore {
    /// `Ok(None)` when nothing was ever stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<B: BlobStore + ?Sized> BlobStore for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// One file per key under a directory, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    dir: PathBuf,
}

impl DirBlobStore {
    /// Open (creating if needed) the blob directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::Persistence(format!("creating state directory {:?}: {}", dir, e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Persistence(format!("invalid blob key {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.blob", key)))
    }
}

impl BlobStore for DirBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Persistence(format!("reading {:?}: {}", path, e))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // 1) write the whole value to a sibling temp file
        let path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!(".{}.blob.tmp", key));
        let mut tmp = fs::File::create(&tmp_path)
            .map_err(|e| Error::Persistence(format!("creating {:?}: {}", tmp_path, e)))?;
        tmp.write_all(value.as_bytes())
            .and_then(|_| tmp.sync_all())
            .map_err(|e| Error::Persistence(format!("writing {:?}: {}", tmp_path, e)))?;

        // 2) rename over the live blob
        fs::rename(&tmp_path, &path).map_err(|e| {
            Error::Persistence(format!("renaming {:?} -> {:?}: {}", tmp_path, path, e))
        })?;

        debug!(key, bytes = value.len(), path = %path.display(), "blob written");
        Ok(())
    }
}

/// Process-local blobs, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
