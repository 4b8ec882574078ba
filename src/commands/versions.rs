// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Versions command - lists versions carrying managed tags

use super::{print_versions, Output, Session};
use anyhow::Result;

/// Run the versions command
pub fn run(session: &Session, output: Output) -> Result<()> {
    let _enter = session.span.enter();
    let store = session.open_store()?;
    let versions = session.list_versions(store.as_ref())?;

    if versions.is_empty() && !output.json {
        println!("No versions carry any configured tag.");
        return Ok(());
    }

    print_versions(&versions, output)
}
