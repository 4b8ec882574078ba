// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! In-memory version store

use super::{retain_relevant, VersionRepository};
use crate::error::{RemoteError, TagResult};
use crate::types::Version;
use std::cell::Cell;
use std::collections::BTreeSet;

/// A version store held in memory.
///
/// Records every `set_tag` call so callers can inspect which writes a
/// rotation performed.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    versions: Vec<Version>,
    writes: Vec<(String, String)>,
    lists: Cell<usize>,
}

impl MemoryRepository {
    /// Create a store from version snapshots
    #[must_use]
    pub fn new(versions: Vec<Version>) -> Self {
        Self { versions, writes: Vec::new(), lists: Cell::new(0) }
    }

    /// All versions, including ones no managed tag points at
    #[must_use]
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Look up a version by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Add a version to the store
    pub fn push(&mut self, version: Version) {
        self.versions.push(version);
    }

    /// `(version id, tag)` pairs passed to `set_tag`, oldest first
    #[must_use]
    pub fn writes(&self) -> &[(String, String)] {
        &self.writes
    }

    /// Number of `list` calls served
    #[must_use]
    pub fn list_count(&self) -> usize {
        self.lists.get()
    }

    /// Forget recorded writes and list calls
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.lists.set(0);
    }

    /// Sorted tags carried by version `id`
    #[must_use]
    pub fn tags_of(&self, id: &str) -> Vec<String> {
        let mut tags = self.get(id).map(|v| v.tags.clone()).unwrap_or_default();
        tags.sort();
        tags
    }
}

impl VersionRepository for MemoryRepository {
    fn list(&self, filter: &BTreeSet<String>) -> TagResult<Vec<Version>> {
        self.lists.set(self.lists.get() + 1);
        Ok(retain_relevant(self.versions.clone(), filter))
    }

    fn set_tag(&mut self, version: &Version, name: &str) -> TagResult<()> {
        if self.get(&version.id).is_none() {
            return Err(RemoteError::NotFound(format!("version {}", version.id)).into());
        }
        self.writes.push((version.id.clone(), name.to_string()));

        for v in &mut self.versions {
            if v.id == version.id {
                if !v.carries(name) {
                    v.tags.push(name.to_string());
                }
            } else {
                v.tags.retain(|t| t != name);
            }
        }
        Ok(())
    }
}
