// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Tag rotation: move a simple tag and cascade its history chain
//!
//! A move runs through fixed steps:
//!
//! 1. locate the version currently carrying the tag; stop if it already
//!    is the target,
//! 2. run the pre-move command,
//! 3. classify the move as a rollback when the target already carries one
//!    of the tag's history pointers,
//! 4. attach the tag to the target,
//! 5. unless rolling back, shift the history chain one slot deeper,
//!    starting with the displaced version.
//!
//! Each step produces a new [`MoveStep`] value instead of mutating shared
//! state. Writes are independent store calls: an error leaves the store at
//! whatever the last completed write produced.

use crate::catalog::TagCatalog;
use crate::error::{TagError, TagResult};
use crate::hook::{render_command, HookRunner, NEW_VERSION_TAG};
use crate::repository::VersionRepository;
use crate::types::{find_by_tag, RotationOutcome, RotationResult, SimpleTag, Version};
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info, Span};

/// Result of locating the tag's current version
#[derive(Debug, Clone)]
enum Located {
    /// Tag already points at the target
    SameVersion(Version),
    /// Tag must move
    Move(MoveStep),
}

/// State threaded through the steps of a move
#[derive(Debug, Clone)]
struct MoveStep {
    target: Version,
    previous: Option<Version>,
    is_rollback: bool,
}

impl MoveStep {
    fn detect_rollback(self, tag: &SimpleTag) -> Self {
        let is_rollback = self.target.tags.iter().any(|t| tag.is_history_tag(t));
        Self { is_rollback, ..self }
    }
}

/// Moves simple tags against a version store
pub struct TagRotator<R, H> {
    repo: R,
    hooks: H,
    filter: BTreeSet<String>,
    span: Span,
}

impl<R: VersionRepository, H: HookRunner> TagRotator<R, H> {
    /// Create a rotator that lists versions carrying any of `filter`.
    ///
    /// Log events are emitted inside child spans of `span`.
    pub fn new(repo: R, hooks: H, filter: BTreeSet<String>, span: Span) -> Self {
        Self { repo, hooks, filter, span }
    }

    /// Create a rotator filtering versions by the catalog's managed names
    pub fn for_catalog(catalog: &TagCatalog, repo: R, hooks: H, span: Span) -> Self {
        Self::new(repo, hooks, catalog.filtering_names(), span)
    }

    /// The underlying version store
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Version names used to filter listings
    pub fn filter(&self) -> &BTreeSet<String> {
        &self.filter
    }

    /// Span that rotation events are attached to
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Give back the store and hook runner
    pub fn into_parts(self) -> (R, H) {
        (self.repo, self.hooks)
    }

    /// Move `tag` onto `target`
    pub fn run(&mut self, tag: &SimpleTag, target: &Version) -> TagResult<RotationOutcome> {
        let span = tracing::info_span!(parent: &self.span, "rotate", tag = %tag.name);
        let _enter = span.enter();

        let step = match self.locate_current(tag, target)? {
            Located::SameVersion(version) => {
                info!("Tag \"{}\" already on version: {}", tag.name, version.id);
                return Ok(RotationOutcome::SameVersion {
                    tag: tag.name.clone(),
                    version: version.id,
                });
            }
            Located::Move(step) => step,
        };

        self.run_pre_hook(tag, &step.target)?;

        let step = step.detect_rollback(tag);
        debug!("isRollback: {}", step.is_rollback);

        self.set_tag(&step.target, &tag.name)?;

        let shifted_depth = match (&step.previous, step.is_rollback) {
            (Some(previous), false) => self.shift_history(tag, previous)?,
            _ => 0,
        };

        info!("Set tag \"{}\" to version: {}", tag.name, step.target.id);

        Ok(RotationOutcome::Moved(RotationResult {
            tag: tag.name.clone(),
            target: step.target,
            previous: step.previous,
            is_rollback: step.is_rollback,
            shifted_depth,
            finished_at: Utc::now(),
        }))
    }

    fn locate_current(&self, tag: &SimpleTag, target: &Version) -> TagResult<Located> {
        let versions = self.repo.list(&self.filter)?;
        let previous = find_by_tag(&versions, &tag.name).cloned();

        if let Some(current) = &previous {
            if current.id == target.id {
                return Ok(Located::SameVersion(current.clone()));
            }
        }

        // Prefer the fresh snapshot of the target when the listing has it
        let target = versions
            .iter()
            .find(|v| v.id == target.id)
            .cloned()
            .unwrap_or_else(|| target.clone());

        Ok(Located::Move(MoveStep { target, previous, is_rollback: false }))
    }

    fn run_pre_hook(&mut self, tag: &SimpleTag, target: &Version) -> TagResult<()> {
        let Some(template) = &tag.pre_move_command else {
            return Ok(());
        };

        let new_version_tag = target.first_tag();
        if template.contains(NEW_VERSION_TAG) && new_version_tag.is_none() {
            info!("Skipping pre-move command because target version does not have any tags");
            return Ok(());
        }

        let command = render_command(template, &tag.name, new_version_tag.unwrap_or_default());
        info!("Running cmd: {}", command);

        match self.hooks.exec(&command) {
            Ok(Some(0)) => Ok(()),
            Ok(status) => Err(TagError::HookFailure { command, status }),
            Err(source) => Err(TagError::HookSpawn { command, source }),
        }
    }

    /// Push `previous` into the history chain, returning the number of
    /// history pointers written.
    fn shift_history(&mut self, tag: &SimpleTag, previous: &Version) -> TagResult<usize> {
        if tag.history_tags.is_empty() {
            return Ok(0);
        }

        // Re-read: the pre-move command may have touched pointers
        let versions = self.repo.list(&self.filter)?;
        let mut advancing = previous.clone();
        let mut written = 0;

        for name in &tag.history_tags {
            let holder = find_by_tag(&versions, name);
            if holder.is_some_and(|h| h.id == advancing.id) {
                break;
            }

            self.set_tag(&advancing, name)?;
            written += 1;

            match holder {
                Some(holder) => advancing = holder.clone(),
                None => break,
            }
        }

        Ok(written)
    }

    fn set_tag(&mut self, version: &Version, name: &str) -> TagResult<()> {
        debug!("Setting tag \"{}\" to version: {}", name, version.id);
        self.repo.set_tag(version, name)
    }
}
