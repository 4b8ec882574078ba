// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Tag catalog built from the `tags` configuration section

use crate::error::{TagError, TagResult};
use crate::types::{GroupTag, SimpleTag, Tag, TagEntry, DEFAULT_HISTORY, LATEST_TAG};
use std::collections::{BTreeSet, HashSet};

/// Deepest history chain a tag may declare
pub const MAX_HISTORY: usize = 100;

/// Ordered, immutable set of tag definitions
#[derive(Debug, Clone)]
pub struct TagCatalog {
    tags: Vec<Tag>,
}

impl TagCatalog {
    /// Build the catalog from raw configuration entries.
    ///
    /// Bare names become simple tags with the default history depth;
    /// records with `members` become group tags and never get a history
    /// chain of their own.
    pub fn build(entries: Option<&[TagEntry]>) -> TagResult<Self> {
        let entries = match entries {
            Some(entries) if !entries.is_empty() => entries,
            _ => return Err(TagError::Config("empty tags list".into())),
        };

        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(entries.len());

        for entry in entries {
            let tag = match entry {
                TagEntry::Name(name) => Tag::Simple(SimpleTag::new(name, DEFAULT_HISTORY)),
                TagEntry::Record(record) => match &record.members {
                    Some(members) => Tag::Group(GroupTag {
                        name: record.name.clone(),
                        members: members.clone(),
                    }),
                    None => {
                        let history = record.history.unwrap_or(DEFAULT_HISTORY);
                        if history > MAX_HISTORY {
                            return Err(TagError::Config(format!(
                                "history of tag {} exceeds {MAX_HISTORY}: {history}",
                                record.name
                            )));
                        }
                        Tag::Simple(SimpleTag {
                            pre_move_command: record.pre_move_command.clone(),
                            ..SimpleTag::new(&record.name, history)
                        })
                    }
                },
            };

            if tag.name().trim().is_empty() {
                return Err(TagError::Config("tag name must not be empty".into()));
            }
            if !seen.insert(tag.name().to_string()) {
                return Err(TagError::Config(format!("duplicate tag name: {}", tag.name())));
            }
            tags.push(tag);
        }

        Ok(Self { tags })
    }

    /// Pointer names worth listing versions for.
    ///
    /// Covers every simple tag, its history chain and the latest marker.
    #[must_use]
    pub fn filtering_names(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .filter_map(Tag::as_simple)
            .flat_map(|tag| std::iter::once(&tag.name).chain(&tag.history_tags))
            .cloned()
            .chain(std::iter::once(LATEST_TAG.to_string()))
            .collect()
    }

    /// Look up a tag by name
    pub fn lookup(&self, name: &str) -> TagResult<&Tag> {
        self.tags
            .iter()
            .find(|tag| tag.name() == name)
            .ok_or_else(|| TagError::NotFound(format!("Unknown tag name: {name}")))
    }

    /// Tags in configuration order
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Iterate tags in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Number of tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the catalog is empty (never true for a built catalog)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
