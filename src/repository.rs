//! Content repository: where parsed entries live and how they are looked up.
//!
//! The rest of the crate only sees the [`ContentRepository`] trait.
//! [`MemoryRepository`] backs it with entries loaded from JSON catalogs.

use crate::error::{Error, Result};
use crate::model::{Entry, EntryId, Kind, Relation};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Read-only access to stored entries.
pub trait ContentRepository {
    /// First published entry, in repository order, whose normalized name
    /// equals the normalized `slug` and whose kind is in `kinds`.
    fn find(&self, slug: &str, kinds: &[Kind]) -> Option<&Entry>;

    fn find_by_id(&self, id: EntryId) -> Option<&Entry>;

    /// Published children of `parent` with the given kind.
    fn children(&self, parent: EntryId, kind: Kind) -> Vec<&Entry>;

    /// Whether any entry carries `version` as a since term.
    fn has_version(&self, version: &str) -> bool;

    /// Published entries that list `target` under `relation`, in
    /// repository order.
    fn referrers(&self, target: EntryId, relation: Relation) -> Vec<&Entry>;
}

/// Names are compared case-insensitively, with `_`, `/` and `-` treated as
/// the same separator, so `Foo_Bar`, `foo-bar` and `foo/bar` are one key.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' | '/' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct Catalog {
    entries: Vec<Entry>,
}

/// In-memory repository preserving catalog order.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    entries: Vec<Entry>,
    by_id: HashMap<EntryId, usize>,
    by_name: HashMap<String, Vec<usize>>,
    versions: HashSet<String>,
    referrers: HashMap<(EntryId, Relation), Vec<usize>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        let mut repo = Self::new();
        repo.extend(entries.into_iter().collect())?;
        Ok(repo)
    }

    /// Add a batch of entries. Either all of them are stored or, on a
    /// duplicate id, none are.
    pub fn extend(&mut self, entries: Vec<Entry>) -> Result<usize> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if self.by_id.contains_key(&entry.id) || !seen.insert(entry.id) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate entry id {} ({})",
                    entry.id, entry.name
                )));
            }
        }
        let count = entries.len();
        for entry in entries {
            self.insert(entry)?;
        }
        Ok(count)
    }

    /// Parse a catalog (`{"entries": [...]}`) and add its entries.
    pub fn extend_from_json(&mut self, json: &str, path: &Path) -> Result<usize> {
        let catalog: Catalog = serde_json::from_str(json).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        self.extend(catalog.entries)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let count = self.extend_from_json(&json, path)?;
        tracing::debug!(path = %path.display(), entries = count, "loaded catalog");
        Ok(count)
    }

    pub fn insert(&mut self, entry: Entry) -> Result<()> {
        if self.by_id.contains_key(&entry.id) {
            return Err(Error::InvalidCatalog(format!(
                "duplicate entry id {} ({})",
                entry.id, entry.name
            )));
        }
        let index = self.entries.len();
        self.by_id.insert(entry.id, index);
        self.by_name
            .entry(normalize_name(&entry.name))
            .or_default()
            .push(index);
        self.versions.extend(entry.since.iter().cloned());
        for relation in Relation::ALL {
            for &target in entry.related_ids(relation) {
                self.referrers.entry((target, relation)).or_default().push(index);
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Check that every parent reference points at a stored entry.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            if let Some(parent) = entry.parent {
                if !self.by_id.contains_key(&parent) {
                    return Err(Error::InvalidCatalog(format!(
                        "entry {} ({}) has unknown parent {}",
                        entry.id, entry.name, parent
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentRepository for MemoryRepository {
    fn find(&self, slug: &str, kinds: &[Kind]) -> Option<&Entry> {
        if slug.is_empty() {
            return None;
        }
        self.by_name
            .get(&normalize_name(slug))?
            .iter()
            .map(|&i| &self.entries[i])
            .find(|e| e.is_published() && kinds.contains(&e.kind))
    }

    fn find_by_id(&self, id: EntryId) -> Option<&Entry> {
        self.by_id.get(&id).map(|&i| &self.entries[i])
    }

    fn children(&self, parent: EntryId, kind: Kind) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.parent == Some(parent) && e.kind == kind && e.is_published())
            .collect()
    }

    fn has_version(&self, version: &str) -> bool {
        self.versions.contains(version)
    }

    fn referrers(&self, target: EntryId, relation: Relation) -> Vec<&Entry> {
        let Some(indices) = self.referrers.get(&(target, relation)) else {
            return Vec::new();
        };
        let mut found: Vec<&Entry> = Vec::with_capacity(indices.len());
        for entry in indices.iter().map(|&i| &self.entries[i]) {
            if entry.is_published() && !found.iter().any(|e| e.id == entry.id) {
                found.push(entry);
            }
        }
        found
    }
}
