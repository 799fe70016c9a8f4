//! Ordered prefab registry with tag and id lookup.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{AssetRef, DedupKey, Entry};

use super::traits::PrefabLookup;

/// Error from an explicit registry edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// Position past the end of the registry
    #[error("Index {index} is out of range (registry has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    /// Tag already used by another entry (strict mode)
    #[error("Tag '{tag}' is already registered at index {existing}")]
    DuplicateTag { tag: String, existing: usize },
    /// Id already used by another entry (strict mode)
    #[error("Id {id} is already registered at index {existing}")]
    DuplicateId { id: i64, existing: usize },
}

/// Non-fatal registry problem reported by [`PrefabRegistry::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryWarning {
    pub message: String,
}

/// Ordered collection of prefab entries.
///
/// Insertion order is significant: lookups return the first matching entry,
/// and the populator assigns new ids from the current length. Tags and ids
/// are not required to be unique; use [`add_strict`](Self::add_strict) to
/// reject collisions or [`check`](Self::check) to report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefabRegistry {
    entries: Vec<Entry>,
}

impl PrefabRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Create a registry from entries in their stored order.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Consume the registry, returning its entries in order.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Find the first entry whose tag equals `tag` exactly (case-sensitive).
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Find the first entry whose id equals `id`.
    pub fn find_by_id(&self, id: i64) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Position of the first entry with `tag`.
    pub fn position_of_tag(&self, tag: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.tag == tag)
    }

    /// Position of the first entry with `id`.
    pub fn position_of_id(&self, id: i64) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Check whether `reference` is already registered under `key`.
    pub fn contains_reference(&self, reference: &AssetRef, key: DedupKey) -> bool {
        self.entries.iter().any(|e| e.reference.same_asset(reference, key))
    }

    /// Append an entry. No validation is performed.
    pub fn add(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Append an entry, rejecting it if its tag or id is already in use.
    pub fn add_strict(&mut self, entry: Entry) -> Result<(), RegistryError> {
        if let Some(existing) = self.position_of_tag(&entry.tag) {
            return Err(RegistryError::DuplicateTag { tag: entry.tag, existing });
        }
        if let Some(existing) = self.position_of_id(entry.id) {
            return Err(RegistryError::DuplicateId { id: entry.id, existing });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the entry at `index`, shifting later entries down.
    pub fn remove(&mut self, index: usize) -> Result<Entry, RegistryError> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    /// Replace the tag of the entry at `index`, returning the old tag.
    pub fn rename(&mut self, index: usize, tag: impl Into<String>) -> Result<String, RegistryError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.entries[index].tag, tag.into()))
    }

    /// Replace the id of the entry at `index`, returning the old id.
    pub fn set_id(&mut self, index: usize, id: i64) -> Result<i64, RegistryError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.entries[index].id, id))
    }

    /// Get the entry at `index`.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// All entries in order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Report every tag and id that appears on more than one entry.
    ///
    /// Lookups on a duplicated key silently resolve to the first entry, so
    /// these are usually editing mistakes.
    pub fn check(&self) -> Vec<RegistryWarning> {
        let mut tags: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        let mut ids: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (index, entry) in self.entries.iter().enumerate() {
            tags.entry(entry.tag.as_str()).or_default().push(index);
            ids.entry(entry.id).or_default().push(index);
        }

        let mut warnings = Vec::new();
        for (tag, positions) in tags.into_iter().filter(|(_, p)| p.len() > 1) {
            warnings.push(RegistryWarning {
                message: format!("Tag '{}' is used by entries {}", tag, join_positions(&positions)),
            });
        }
        for (id, positions) in ids.into_iter().filter(|(_, p)| p.len() > 1) {
            warnings.push(RegistryWarning {
                message: format!("Id {} is used by entries {}", id, join_positions(&positions)),
            });
        }
        warnings
    }

    fn check_index(&self, index: usize) -> Result<(), RegistryError> {
        if index >= self.entries.len() {
            return Err(RegistryError::IndexOutOfRange { index, len: self.entries.len() });
        }
        Ok(())
    }
}

fn join_positions(positions: &[usize]) -> String {
    positions.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

impl PrefabLookup for PrefabRegistry {
    fn get_by_tag(&self, tag: &str) -> Option<&AssetRef> {
        self.find_by_tag(tag).map(|e| &e.reference)
    }

    fn get_by_id(&self, id: i64) -> Option<&AssetRef> {
        self.find_by_id(id).map(|e| &e.reference)
    }
}

impl<'a> IntoIterator for &'a PrefabRegistry {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
