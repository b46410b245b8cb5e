//! Entity catalog: canonical keys and the source URLs behind each one.
//!
//! Loaded once at startup from a JSON object (`key -> [url, ...]`) and an
//! optional newline-separated keys file that fixes the order keys are offered
//! to the extraction model and scanned by the fuzzy resolver.

use ltipp_core::{AppError, AppResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Read-only mapping from entity key to its source URLs.
#[derive(Debug, Clone)]
pub struct Catalog {
    urls: HashMap<String, Vec<String>>,
    keys: Vec<String>,
}

impl Catalog {
    /// Build a catalog from an in-memory map. Keys are ordered by `key_order`
    /// first, then any remaining map keys in sorted order.
    ///
    /// # Errors
    /// Returns `AppError::Catalog` when an entry has no URLs or a blank URL.
    pub fn from_parts(
        map: BTreeMap<String, Vec<String>>,
        key_order: &[String],
    ) -> AppResult<Self> {
        for (key, urls) in &map {
            if key.trim().is_empty() {
                return Err(AppError::Catalog("Catalog contains an empty key".to_string()));
            }
            if urls.is_empty() {
                return Err(AppError::Catalog(format!("Key '{}' has no URLs", key)));
            }
            if urls.iter().any(|url| url.trim().is_empty()) {
                return Err(AppError::Catalog(format!("Key '{}' has a blank URL", key)));
            }
        }

        let mut seen = HashSet::new();
        let mut keys = Vec::with_capacity(map.len());

        for key in key_order.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
            if !map.contains_key(key) {
                tracing::warn!(key, "Key listed in keys file has no URLs in the catalog, ignoring");
                continue;
            }
            if seen.insert(key.to_string()) {
                keys.push(key.to_string());
            }
        }

        for key in map.keys() {
            if seen.insert(key.clone()) {
                keys.push(key.clone());
            }
        }

        Ok(Self {
            urls: map.into_iter().collect(),
            keys,
        })
    }

    /// Load the catalog map and, when present, the keys file.
    ///
    /// A missing keys file is not an error; map keys are then used in sorted order.
    pub fn load(map_path: &Path, keys_path: Option<&Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(map_path).map_err(|e| {
            AppError::Catalog(format!(
                "Failed to read catalog map {}: {}",
                map_path.display(),
                e
            ))
        })?;

        let map: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Catalog(format!(
                "Catalog map {} must be a JSON object of string arrays: {}",
                map_path.display(),
                e
            ))
        })?;

        let key_order = match keys_path {
            Some(path) if path.exists() => std::fs::read_to_string(path)?
                .lines()
                .map(str::to_string)
                .collect(),
            Some(path) => {
                tracing::debug!(path = %path.display(), "No keys file, using catalog order");
                Vec::new()
            }
            None => Vec::new(),
        };

        let catalog = Self::from_parts(map, &key_order)?;

        tracing::info!(
            keys = catalog.len(),
            path = %map_path.display(),
            "Loaded entity catalog"
        );

        Ok(catalog)
    }

    /// URLs registered for an exact key.
    pub fn urls_for(&self, key: &str) -> Option<&[String]> {
        self.urls.get(key).map(Vec::as_slice)
    }

    /// All keys in lookup order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Keys one per line, as shown to the extraction model.
    pub fn keys_listing(&self) -> String {
        self.keys.join("\n")
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
