// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Version stores: where versions live and tags get attached

pub mod file;
pub mod memory;
pub mod remote;

use crate::error::TagResult;
use crate::types::Version;
use std::collections::BTreeSet;

pub use file::FileRepository;
pub use memory::MemoryRepository;
pub use remote::RemoteRepository;

/// Access to a function's versions and their tags.
///
/// The store guarantees that a tag name is attached to at most one
/// version at a time; attaching it elsewhere detaches it from the old one.
pub trait VersionRepository {
    /// List versions carrying at least one of `filter`, in store order
    fn list(&self, filter: &BTreeSet<String>) -> TagResult<Vec<Version>>;

    /// Attach tag `name` to `version`. Repeating the call is a no-op.
    fn set_tag(&mut self, version: &Version, name: &str) -> TagResult<()>;
}

impl<R: VersionRepository + ?Sized> VersionRepository for &mut R {
    fn list(&self, filter: &BTreeSet<String>) -> TagResult<Vec<Version>> {
        (**self).list(filter)
    }

    fn set_tag(&mut self, version: &Version, name: &str) -> TagResult<()> {
        (**self).set_tag(version, name)
    }
}

impl<R: VersionRepository + ?Sized> VersionRepository for Box<R> {
    fn list(&self, filter: &BTreeSet<String>) -> TagResult<Vec<Version>> {
        (**self).list(filter)
    }

    fn set_tag(&mut self, version: &Version, name: &str) -> TagResult<()> {
        (**self).set_tag(version, name)
    }
}

/// Keep only versions carrying one of the filter names
pub(crate) fn retain_relevant(versions: Vec<Version>, filter: &BTreeSet<String>) -> Vec<Version> {
    versions
        .into_iter()
        .filter(|v| v.tags.iter().any(|t| filter.contains(t)))
        .collect()
}
