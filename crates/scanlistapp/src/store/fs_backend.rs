use super::backend::StorageBackend;
use crate::error::{Result, ScanError};
use crate::model::{ScanItem, ScanList};
use fs4::fs_std::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LISTS_FILE: &str = "lists.json";
pub const ITEMS_FILE: &str = "items.json";
pub const LOCK_FILE: &str = ".lock";

/// Exclusive advisory lock on a data directory, released on drop.
///
/// Writers in other processes (and other `FsBackend` handles in this one)
/// block in [`StorageBackend::lock`] until it is dropped.
pub struct StoreLock {
    _file: File,
}

pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(ScanError::persistence)?;
        }
        Ok(())
    }

    fn load_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path).map_err(ScanError::persistence)?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).map_err(ScanError::persistence)
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;

        let content = serde_json::to_string_pretty(value).map_err(ScanError::persistence)?;

        // Atomic write: tmp file then rename over the target
        let tmp_file = self.root.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(ScanError::persistence)?;
        if let Err(e) = fs::rename(&tmp_file, self.root.join(name)) {
            let _ = fs::remove_file(&tmp_file);
            return Err(ScanError::persistence(e));
        }

        tracing::debug!(file = name, root = %self.root.display(), "store written");
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    type Guard = StoreLock;

    fn lock(&self) -> Result<StoreLock> {
        self.ensure_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.root.join(LOCK_FILE))
            .map_err(ScanError::persistence)?;
        FileExt::lock_exclusive(&file).map_err(ScanError::persistence)?;
        Ok(StoreLock { _file: file })
    }

    fn load_lists(&self) -> Result<HashMap<Uuid, ScanList>> {
        self.load_json(LISTS_FILE)
    }

    fn save_lists(&self, lists: &HashMap<Uuid, ScanList>) -> Result<()> {
        self.save_json(LISTS_FILE, lists)
    }

    fn load_items(&self) -> Result<HashMap<Uuid, ScanItem>> {
        self.load_json(ITEMS_FILE)
    }

    fn save_items(&self, items: &HashMap<Uuid, ScanItem>) -> Result<()> {
        self.save_json(ITEMS_FILE, items)
    }

    fn location(&self) -> PathBuf {
        self.root.clone()
    }
}
