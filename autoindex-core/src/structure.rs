//! Rebuilds the directory tree of a bucket from its flat key listing.
//!
//! The result is an arena of [`StructureLevel`]s keyed by directory key, with the bucket
//! root stored under the empty key. Each level owns the rows that sit directly inside it:
//! its files and its immediate subdirectories. Every entry ends up in exactly one level.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::classify::{basename, parent_key, ListingEntry};

/// Key of the bucket root level.
pub const ROOT_KEY: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureLevel {
    /// Last segment of the level key, empty for the root.
    pub directory_name: String,
    pub is_root_level: bool,
    pub files: Vec<ListingEntry>,
    pub directories: Vec<ListingEntry>,
}

impl StructureLevel {
    fn new(key: &str) -> Self {
        Self {
            directory_name: basename(key).to_string(),
            is_root_level: key == ROOT_KEY,
            files: Vec::new(),
            directories: Vec::new(),
        }
    }

    /// Directories first, then files, in the order they were collected.
    pub fn children(&self) -> impl Iterator<Item = &ListingEntry> {
        self.directories.iter().chain(self.files.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Structure {
    levels: BTreeMap<String, StructureLevel>,
}

impl Structure {
    pub fn root(&self) -> &StructureLevel {
        &self.levels[ROOT_KEY]
    }

    pub fn level(&self, key: &str) -> Option<&StructureLevel> {
        self.levels.get(key)
    }

    /// Levels in key order; the root comes first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructureLevel)> {
        self.levels.iter().map(|(key, level)| (key.as_str(), level))
    }

    /// Number of levels, root included, so never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Key of the level listing the entry with `key`, if any.
    #[cfg(test)]
    fn owner_of(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(_, level)| level.children().any(|entry| entry.key == key))
            .map(|(owner, _)| owner)
    }
}

/// Assign every directory and file to the level of its immediate parent.
///
/// `directories` is expected deepest first, as produced by
/// [`objects_to_directories`](crate::classify::objects_to_directories); that order is kept
/// inside each level. Entries whose parent is not a known level (malformed keys such as
/// `a//b`) are skipped with a warning.
pub fn build_structure(directories: &[ListingEntry], files: &[ListingEntry]) -> Structure {
    let mut levels: BTreeMap<String, StructureLevel> = directories
        .iter()
        .map(|dir| (dir.key.clone(), StructureLevel::new(&dir.key)))
        .collect();
    levels.insert(ROOT_KEY.to_string(), StructureLevel::new(ROOT_KEY));

    for dir in directories {
        let parent = parent_key(&dir.key).unwrap_or(ROOT_KEY);
        match levels.get_mut(parent) {
            Some(level) => level.directories.push(dir.clone()),
            None => warn!(key = %dir.key, parent, "No level for directory parent, skipping"),
        }
    }

    for file in files {
        let parent = parent_key(&file.key).unwrap_or(ROOT_KEY);
        match levels.get_mut(parent) {
            Some(level) => level.files.push(file.clone()),
            None => warn!(key = %file.key, parent, "No level for file parent, skipping"),
        }
    }

    debug!(levels = levels.len(), "Built directory structure");
    Structure { levels }
}
