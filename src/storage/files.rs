//! Marker files on the local filesystem
//!
//! One empty `<key>.log` file per marker under a single directory.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use super::MarkerStore;
use crate::error::Result;

pub struct FileMarkerStore {
    dir: PathBuf,
}

impl FileMarkerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.log", key))
    }
}

impl MarkerStore for FileMarkerStore {
    fn exists(&self, key: &str) -> Result<bool> {
        match std::fs::metadata(self.path_for(key)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&self, key: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!("Marker created: {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Marker already exists: {:?}", path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
