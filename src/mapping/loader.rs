//! Mapping loader for reading mapping files from disk
//!
//! Every `*.json` file in the mapping directory holds one `StaticMapping`.
//! Malformed files and duplicate collection names fail the whole load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::contract::ResolvedMapping;
use super::errors::{MappingError, MappingResult};
use super::static_mapping::StaticMapping;
use crate::observability::{log_event, Event};

/// Registry of mappings read from a directory, indexed by collection name
pub struct MappingLoader {
    mapping_dir: PathBuf,
    mappings: HashMap<String, StaticMapping>,
}

impl MappingLoader {
    pub fn new(mapping_dir: impl Into<PathBuf>) -> Self {
        Self {
            mapping_dir: mapping_dir.into(),
            mappings: HashMap::new(),
        }
    }

    pub fn mapping_dir(&self) -> &Path {
        &self.mapping_dir
    }

    /// Loads all mapping files. A missing directory loads nothing.
    pub fn load_all(&mut self) -> MappingResult<()> {
        if !self.mapping_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.mapping_dir).map_err(|e| {
            MappingError::invalid(format!(
                "Failed to read mapping directory {}: {}",
                self.mapping_dir.display(),
                e
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                MappingError::invalid(format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        // Stable order makes duplicate detection deterministic
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> MappingResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            MappingError::invalid(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mapping = StaticMapping::from_json_str(&content).map_err(|e| {
            MappingError::invalid(format!("{}: {}", path.display(), e.message()))
        })?;

        log_event(
            Event::MappingLoaded,
            &[
                ("collection", mapping.name.as_str()),
                ("path", &path.display().to_string()),
            ],
        );
        self.register(mapping)
    }

    /// Registers a mapping directly
    pub fn register(&mut self, mapping: StaticMapping) -> MappingResult<()> {
        ResolvedMapping::resolve(&mapping)?;
        if self.mappings.contains_key(&mapping.name) {
            return Err(MappingError::invalid(format!(
                "Collection '{}' is mapped more than once",
                mapping.name
            ))
            .in_collection(&mapping.name));
        }
        self.mappings.insert(mapping.name.clone(), mapping);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StaticMapping> {
        self.mappings.get(name)
    }

    /// Collection names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
