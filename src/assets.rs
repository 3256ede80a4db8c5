//! Segment visual catalog
//!
//! Loading itself happens in the host; the simulation only needs to know
//! whether a given visual is ready to be drawn.

use serde::{Deserialize, Serialize};

/// One selectable segment look
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Visual/shape key handed to the presentation layer
    pub key: String,
    /// Whether the host has finished loading the visual
    pub ready: bool,
}

/// Fixed catalog of segment visuals, picked from uniformly at random
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetCatalog {
    entries: Vec<CatalogEntry>,
}

impl AssetCatalog {
    /// Catalog whose entries all start out not ready
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: keys
                .into_iter()
                .map(|key| CatalogEntry {
                    key: key.into(),
                    ready: false,
                })
                .collect(),
        }
    }

    /// Catalog whose entries are all ready (headless runs and tests)
    pub fn preloaded<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::new(keys);
        for entry in &mut catalog.entries {
            entry.ready = true;
        }
        catalog
    }

    /// Record the host's load result for a key. Returns false for unknown keys.
    pub fn set_ready(&mut self, key: &str, ready: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.ready = ready;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_tracking() {
        let mut catalog = AssetCatalog::new(["pose_a", "pose_b"]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.entries().iter().all(|e| !e.ready));

        assert!(catalog.set_ready("pose_b", true));
        assert!(!catalog.set_ready("pose_z", true));
        assert!(!catalog.get(0).map(|e| e.ready).unwrap_or(true));
        assert!(catalog.get(1).map(|e| e.ready).unwrap_or(false));
    }

    #[test]
    fn test_preloaded_catalog_is_ready() {
        let catalog = AssetCatalog::preloaded(["pose"]);
        assert!(catalog.entries().iter().all(|e| e.ready));
    }
}
