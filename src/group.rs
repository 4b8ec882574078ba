// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Group tags: rotate member tags one after another

use crate::catalog::TagCatalog;
use crate::error::{TagError, TagResult};
use crate::hook::HookRunner;
use crate::repository::VersionRepository;
use crate::rotator::TagRotator;
use crate::types::{GroupTag, RotationOutcome, SimpleTag, Tag, Version};
use tracing::info;

/// Resolves group tags and drives the rotator over their members
pub struct GroupExpander<'c> {
    catalog: &'c TagCatalog,
}

impl<'c> GroupExpander<'c> {
    /// Create an expander over `catalog`
    #[must_use]
    pub fn new(catalog: &'c TagCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve the group's members to simple tags, in declared order
    pub fn expand(&self, group: &GroupTag) -> TagResult<Vec<&'c SimpleTag>> {
        group
            .members
            .iter()
            .map(|name| match self.catalog.lookup(name)? {
                Tag::Simple(tag) => Ok(tag),
                Tag::Group(_) => Err(TagError::Config(format!(
                    "group \"{}\" member \"{}\" is itself a group",
                    group.name, name
                ))),
            })
            .collect()
    }

    /// Rotate every member of `group` onto `target`.
    ///
    /// Members move strictly in order; the first failure stops the walk
    /// and later members are left untouched.
    pub fn rotate<R, H>(
        &self,
        group: &GroupTag,
        target: &Version,
        rotator: &mut TagRotator<R, H>,
    ) -> TagResult<Vec<RotationOutcome>>
    where
        R: VersionRepository,
        H: HookRunner,
    {
        let members = self.expand(group)?;
        let _enter =
            tracing::info_span!(parent: rotator.span(), "group", group = %group.name).entered();
        info!("Moving group \"{}\" ({} tags)", group.name, members.len());

        let mut outcomes = Vec::with_capacity(members.len());
        for tag in members {
            outcomes.push(rotator.run(tag, target)?);
        }
        Ok(outcomes)
    }

    /// Rotate a simple or group tag onto `target`
    pub fn rotate_tag<R, H>(
        &self,
        tag: &Tag,
        target: &Version,
        rotator: &mut TagRotator<R, H>,
    ) -> TagResult<Vec<RotationOutcome>>
    where
        R: VersionRepository,
        H: HookRunner,
    {
        match tag {
            Tag::Simple(tag) => Ok(vec![rotator.run(tag, target)?]),
            Tag::Group(group) => self.rotate(group, target, rotator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TagEntry, TagRecord};

    fn catalog() -> TagCatalog {
        let entries = vec![
            TagEntry::from("prod"),
            TagEntry::from("stage"),
            TagEntry::Record(TagRecord {
                name: "release".into(),
                members: Some(vec!["stage".into(), "prod".into()]),
                ..TagRecord::default()
            }),
            TagEntry::Record(TagRecord {
                name: "nested".into(),
                members: Some(vec!["release".into()]),
                ..TagRecord::default()
            }),
            TagEntry::Record(TagRecord {
                name: "broken".into(),
                members: Some(vec!["prod".into(), "ghost".into()]),
                ..TagRecord::default()
            }),
        ];
        TagCatalog::build(Some(entries.as_slice())).unwrap()
    }

    fn group<'a>(catalog: &'a TagCatalog, name: &str) -> &'a GroupTag {
        match catalog.lookup(name).unwrap() {
            Tag::Group(group) => group,
            Tag::Simple(_) => panic!("{name} is not a group"),
        }
    }

    #[test]
    fn test_expand_preserves_member_order() {
        let catalog = catalog();
        let expander = GroupExpander::new(&catalog);

        let names: Vec<&str> = expander
            .expand(group(&catalog, "release"))
            .unwrap()
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();

        assert_eq!(names, vec!["stage", "prod"]);
    }

    #[test]
    fn test_expand_rejects_nested_group() {
        let catalog = catalog();
        let err = GroupExpander::new(&catalog).expand(group(&catalog, "nested")).unwrap_err();
        assert!(matches!(err, TagError::Config(_)));
    }

    #[test]
    fn test_expand_unknown_member() {
        let catalog = catalog();
        let err = GroupExpander::new(&catalog).expand(group(&catalog, "broken")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown tag name: ghost");
    }
}
