use super::backend::HandoffBackend;
use crate::error::{Result, ScanError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Handoff region backed by a directory that every cooperating process can reach.
///
/// Each key is one `<key>.json` file. Writes go through a temp file and a
/// rename, so a reader never sees half a document. `take` claims the file by
/// renaming it to a name only this call knows; a racing caller finds the key
/// gone.
#[derive(Debug, Clone)]
pub struct FsHandoff {
    root: Option<PathBuf>,
}

impl FsHandoff {
    pub fn new(root: PathBuf) -> Self {
        Self { root: Some(root) }
    }

    /// A handoff with no shared directory. Every operation reports unavailable.
    pub fn unavailable() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn dir(&self) -> Result<&Path> {
        let root = self
            .root
            .as_deref()
            .ok_or_else(|| ScanError::ChannelUnavailable("no shared directory configured".into()))?;
        if !root.exists() {
            fs::create_dir_all(root).map_err(|e| unavailable(root, e))?;
        }
        Ok(root)
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.dir()?.join(format!("{}.json", key)))
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> ScanError {
    ScanError::ChannelUnavailable(format!("{}: {}", path.display(), err))
}

impl HandoffBackend for FsHandoff {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(&path, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp = self.dir()?.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));

        fs::write(&tmp, value).map_err(|e| unavailable(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(unavailable(&path, e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(&path, e)),
        }
    }

    fn take(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        let claim = self
            .dir()?
            .join(format!(".{}-{}.claim", key, Uuid::new_v4()));

        match fs::rename(&path, &claim) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(&path, e)),
        }

        let content = fs::read_to_string(&claim).map_err(|e| unavailable(&claim, e));
        let _ = fs::remove_file(&claim);
        content.map(Some)
    }

    fn describe(&self) -> String {
        match &self.root {
            Some(root) => root.display().to_string(),
            None => "<unavailable>".to_string(),
        }
    }
}
