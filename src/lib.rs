// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Tagshift library - move deployment tags across immutable versions
//!
//! A function service publishes immutable versions and routes traffic
//! through mutable tags. This crate moves a tag onto a new version while
//! keeping a bounded history chain (`prod-1`, `prod-2`, ...) so that the
//! previous positions can always be restored, and rotates group tags
//! member by member.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod group;
pub mod hook;
pub mod repository;
pub mod rotator;
pub mod select;

/// Core data types: tags, versions and rotation results
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    /// Pointer the function service keeps on the newest version
    pub const LATEST_TAG: &str = "$latest";

    /// History depth used when a tag entry does not set one
    pub const DEFAULT_HISTORY: usize = 2;

    // =========================================================================
    // Configuration entries
    // =========================================================================

    /// A raw `tags` entry from the configuration file
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum TagEntry {
        /// Bare tag name with default history depth
        Name(String),
        /// Structured tag or group definition
        Record(TagRecord),
    }

    impl From<&str> for TagEntry {
        fn from(name: &str) -> Self {
            Self::Name(name.to_string())
        }
    }

    /// Structured tag entry
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TagRecord {
        /// Tag name
        pub name: String,
        /// Number of history tags (`name-1` .. `name-N`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub history: Option<usize>,
        /// Shell command run before the tag moves
        #[serde(default, alias = "cmd_pre", skip_serializing_if = "Option::is_none")]
        pub pre_move_command: Option<String>,
        /// Member tag names; presence makes this a group tag
        #[serde(default, alias = "tags", skip_serializing_if = "Option::is_none")]
        pub members: Option<Vec<String>>,
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// A tag with its own history chain
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct SimpleTag {
        /// Tag name, the pointer itself
        pub name: String,
        /// History pointers, newest first
        pub history_tags: Vec<String>,
        /// Command template run before the tag moves
        #[serde(skip_serializing_if = "Option::is_none")]
        pub pre_move_command: Option<String>,
    }

    impl SimpleTag {
        /// Create a tag with `history` derived history pointers
        #[must_use]
        pub fn new(name: &str, history: usize) -> Self {
            Self {
                name: name.to_string(),
                history_tags: (1..=history).map(|i| format!("{name}-{i}")).collect(),
                pre_move_command: None,
            }
        }

        /// Attach a pre-move command template
        #[must_use]
        pub fn with_pre_move_command(mut self, command: impl Into<String>) -> Self {
            self.pre_move_command = Some(command.into());
            self
        }

        /// Whether `name` is one of this tag's history pointers
        #[must_use]
        pub fn is_history_tag(&self, name: &str) -> bool {
            self.history_tags.iter().any(|h| h == name)
        }
    }

    /// A named list of simple tags moved together
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct GroupTag {
        /// Group name
        pub name: String,
        /// Member tag names in rotation order
        pub members: Vec<String>,
    }

    /// A catalog entry: either a simple tag or a group
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    #[serde(tag = "kind", rename_all = "lowercase")]
    pub enum Tag {
        /// Tag with history chain
        Simple(SimpleTag),
        /// Group of simple tags
        Group(GroupTag),
    }

    impl Tag {
        /// Tag name
        #[must_use]
        pub fn name(&self) -> &str {
            match self {
                Self::Simple(tag) => &tag.name,
                Self::Group(group) => &group.name,
            }
        }

        /// Borrow as a simple tag
        #[must_use]
        pub fn as_simple(&self) -> Option<&SimpleTag> {
            match self {
                Self::Simple(tag) => Some(tag),
                Self::Group(_) => None,
            }
        }

        /// Whether this is a group tag
        #[must_use]
        pub fn is_group(&self) -> bool {
            matches!(self, Self::Group(_))
        }
    }

    // =========================================================================
    // Versions
    // =========================================================================

    /// An immutable function version and the pointers it carries
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Version {
        /// Opaque version identifier
        pub id: String,
        /// Pointer names currently attached
        #[serde(default)]
        pub tags: Vec<String>,
    }

    impl Version {
        /// Create a version snapshot
        #[must_use]
        pub fn new(id: &str, tags: &[&str]) -> Self {
            Self {
                id: id.to_string(),
                tags: tags.iter().map(|t| (*t).to_string()).collect(),
            }
        }

        /// Whether the version carries pointer `name`
        #[must_use]
        pub fn carries(&self, name: &str) -> bool {
            self.tags.iter().any(|t| t == name)
        }

        /// First pointer name attached, if any
        #[must_use]
        pub fn first_tag(&self) -> Option<&str> {
            self.tags.first().map(String::as_str)
        }
    }

    /// Find the version carrying pointer `name`
    #[must_use]
    pub fn find_by_tag<'a>(versions: &'a [Version], name: &str) -> Option<&'a Version> {
        versions.iter().find(|v| v.carries(name))
    }

    /// Render a version as `id  tag-a,tag-b` with tags sorted
    #[must_use]
    pub fn format_version(version: &Version) -> String {
        let mut tags: Vec<&str> = version.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        format!("{}  {}", version.id, tags.join(","))
    }

    // =========================================================================
    // Rotation results
    // =========================================================================

    /// Record of one simple-tag move
    #[derive(Debug, Clone, Serialize)]
    pub struct RotationResult {
        /// Tag that moved
        pub tag: String,
        /// Version the tag now points at
        pub target: Version,
        /// Version the tag pointed at before, if any
        pub previous: Option<Version>,
        /// Target was already inside the tag's history chain
        pub is_rollback: bool,
        /// Number of history pointers written
        pub shifted_depth: usize,
        /// When the move completed
        pub finished_at: DateTime<Utc>,
    }

    /// Outcome of rotating one simple tag
    #[derive(Debug, Clone, Serialize)]
    #[serde(tag = "outcome", rename_all = "snake_case")]
    pub enum RotationOutcome {
        /// Tag already pointed at the target; nothing was written
        SameVersion {
            /// Tag name
            tag: String,
            /// Version id it already points at
            version: String,
        },
        /// Tag was moved
        Moved(RotationResult),
    }

    impl RotationOutcome {
        /// Name of the rotated tag
        #[must_use]
        pub fn tag(&self) -> &str {
            match self {
                Self::SameVersion { tag, .. } => tag,
                Self::Moved(result) => &result.tag,
            }
        }

        /// Whether any pointer was written
        #[must_use]
        pub fn moved(&self) -> bool {
            matches!(self, Self::Moved(_))
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::catalog::TagCatalog;
    pub use crate::error::{RemoteError, TagError, TagResult};
    pub use crate::group::GroupExpander;
    pub use crate::hook::{HookRunner, ShellHookRunner};
    pub use crate::repository::VersionRepository;
    pub use crate::rotator::TagRotator;
    pub use crate::types::*;
}
