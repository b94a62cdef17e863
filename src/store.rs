use std::path::{Path, PathBuf};

use crate::{LookoutError, Result};

/// Remembers the last delivered post per handle, one small file each.
#[derive(Debug, Clone)]
pub struct LastSeenStore {
    dir: PathBuf,
}

impl LastSeenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Handles become file names, so only ASCII letters, digits and `_` pass.
    pub fn path_for(&self, handle: &str) -> Result<PathBuf> {
        let valid = !handle.is_empty()
            && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(LookoutError::InvalidHandle(handle.to_string()));
        }
        Ok(self.dir.join(format!("{handle}_last_post.txt")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn read(&self, handle: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(handle)?).await {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write(&self, handle: &str, id: &str) -> Result<()> {
        let path = self.path_for(handle)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, id).await?;
        Ok(())
    }
}
