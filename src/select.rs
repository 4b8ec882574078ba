// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Non-interactive selection of the version and tag to move

use crate::catalog::TagCatalog;
use crate::error::{TagError, TagResult};
use crate::types::{Tag, Version};

/// Pick the version matching `query` by id, or else by a tag it carries
pub fn select_version<'a>(versions: &'a [Version], query: &str) -> TagResult<&'a Version> {
    versions
        .iter()
        .find(|v| v.id == query)
        .or_else(|| versions.iter().find(|v| v.carries(query)))
        .ok_or_else(|| TagError::NotFound(format!("Unknown version or tag: {query}")))
}

/// Pick the catalog tag named `name`
pub fn select_tag<'a>(catalog: &'a TagCatalog, name: &str) -> TagResult<&'a Tag> {
    catalog.lookup(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions() -> Vec<Version> {
        vec![
            Version::new("d4e1", &["$latest"]),
            Version::new("a9c3", &["prod", "d4e1"]),
        ]
    }

    #[test]
    fn test_select_by_id_first() {
        let versions = versions();
        assert_eq!(select_version(&versions, "d4e1").unwrap().id, "d4e1");
    }

    #[test]
    fn test_select_by_tag() {
        let versions = versions();
        assert_eq!(select_version(&versions, "prod").unwrap().id, "a9c3");
        assert_eq!(select_version(&versions, "$latest").unwrap().id, "d4e1");
    }

    #[test]
    fn test_select_unknown() {
        let err = select_version(&versions(), "stage").unwrap_err();
        assert_eq!(err.to_string(), "Unknown version or tag: stage");
    }
}
