// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! JSON-file version store for local use and testing

use super::{MemoryRepository, VersionRepository};
use crate::error::{RemoteError, TagResult};
use crate::types::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of a local store
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    versions: Vec<Version>,
}

/// Version store persisted to a JSON file.
///
/// Every `set_tag` is written back immediately, so a failed rotation
/// leaves the file at its last completed write.
#[derive(Debug)]
pub struct FileRepository {
    path: PathBuf,
    inner: MemoryRepository,
}

impl FileRepository {
    /// Open the store at `path`
    pub fn open(path: &Path) -> TagResult<Self> {
        if !path.exists() {
            return Err(RemoteError::NotFound(format!("version store {}", path.display())).into());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            RemoteError::Operation(format!("failed to read {}: {e}", path.display()))
        })?;
        let store: StoreFile = serde_json::from_str(&content).map_err(|e| {
            RemoteError::Operation(format!("failed to parse {}: {e}", path.display()))
        })?;

        tracing::debug!(
            "Opened local store {} ({} versions)",
            path.display(),
            store.versions.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryRepository::new(store.versions),
        })
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> TagResult<()> {
        let store = StoreFile { versions: self.inner.versions().to_vec() };
        let json = serde_json::to_string_pretty(&store)
            .map_err(|e| RemoteError::Operation(format!("failed to serialize store: {e}")))?;
        fs::write(&self.path, json).map_err(|e| {
            RemoteError::Operation(format!("failed to write {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

impl VersionRepository for FileRepository {
    fn list(&self, filter: &BTreeSet<String>) -> TagResult<Vec<Version>> {
        self.inner.list(filter)
    }

    fn set_tag(&mut self, version: &Version, name: &str) -> TagResult<()> {
        self.inner.set_tag(version, name)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_tag_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fn.json");
        fs::write(
            &path,
            r#"{"versions": [{"id": "v1", "tags": ["prod"]}, {"id": "v2", "tags": ["$latest"]}]}"#,
        )
        .unwrap();

        let mut repo = FileRepository::open(&path).unwrap();
        repo.set_tag(&Version::new("v2", &["$latest"]), "prod").unwrap();

        let reopened = FileRepository::open(&path).unwrap();
        let all: BTreeSet<String> = ["prod".to_string()].into_iter().collect();
        let versions = reopened.list(&all).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].id, "v2");
    }

    #[test]
    fn test_missing_store() {
        let dir = TempDir::new().unwrap();
        let err = FileRepository::open(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
