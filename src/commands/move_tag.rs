// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Move command - moves a tag or group of tags onto a version

use super::{print_versions, Output, Session};
use crate::group::GroupExpander;
use crate::hook::ShellHookRunner;
use crate::rotator::TagRotator;
use crate::select::{select_tag, select_version};
use crate::types::RotationOutcome;
use anyhow::{Context, Result};
use tracing::info;

/// Run the move command.
///
/// `version` is a version id or a tag the version already carries.
pub fn run(session: &Session, tag_name: &str, version: &str, output: Output) -> Result<()> {
    let _enter = session.span.enter();
    let mut store = session.open_store()?;

    let versions = session.list_versions(store.as_ref())?;
    let target = select_version(&versions, version)?.clone();
    let tag = select_tag(&session.catalog, tag_name)?;

    info!("Moving tag \"{}\" to version: {}", tag.name(), target.id);

    let outcomes = {
        let mut rotator = TagRotator::for_catalog(
            &session.catalog,
            &mut store,
            ShellHookRunner,
            session.span.clone(),
        );
        GroupExpander::new(&session.catalog)
            .rotate_tag(tag, &target, &mut rotator)
            .with_context(|| format!("Failed to move tag \"{}\"", tag.name()))?
    };

    let versions = session.list_versions(store.as_ref())?;

    if output.json {
        let report = serde_json::json!({ "outcomes": outcomes, "versions": versions });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &outcomes {
            print_outcome(outcome);
        }
        println!();
        print_versions(&versions, output)?;
    }

    info!("Done.");
    Ok(())
}

fn print_outcome(outcome: &RotationOutcome) {
    match outcome {
        RotationOutcome::SameVersion { tag, version } => {
            println!("{tag}: already on {version}");
        }
        RotationOutcome::Moved(result) => {
            let from = result.previous.as_ref().map_or("-", |v| v.id.as_str());
            let note = if result.is_rollback {
                " (rollback)".to_string()
            } else if result.shifted_depth > 0 {
                format!(" (history shifted {})", result.shifted_depth)
            } else {
                String::new()
            };
            println!("{}: {} -> {}{}", result.tag, from, result.target.id, note);
        }
    }
}
