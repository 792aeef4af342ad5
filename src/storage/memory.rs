//! Process-local marker store

use parking_lot::Mutex;
use std::collections::HashSet;

use super::MarkerStore;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    keys: Mutex<HashSet<String>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.keys.lock().contains(key))
    }

    fn create(&self, key: &str) -> Result<()> {
        self.keys.lock().insert(key.to_string());
        Ok(())
    }
}
