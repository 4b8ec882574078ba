// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Tags command - prints the configured tag catalog

use super::{Output, Session};
use crate::types::Tag;
use anyhow::Result;
use owo_colors::OwoColorize;

/// Run the tags command
pub fn run(session: &Session, output: Output) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(session.catalog.tags())?);
        return Ok(());
    }

    println!("Tags ({}):", session.catalog.len());
    for tag in session.catalog.iter() {
        let name = if output.color {
            tag.name().bold().to_string()
        } else {
            tag.name().to_string()
        };
        match tag {
            Tag::Simple(simple) => {
                if simple.history_tags.is_empty() {
                    println!("  {name}");
                } else {
                    println!("  {name} -> {}", simple.history_tags.join(" -> "));
                }
                if let Some(command) = &simple.pre_move_command {
                    println!("    pre-move: {command}");
                }
            }
            Tag::Group(group) => {
                println!("  {name} (group: {})", group.members.join(", "));
            }
        }
    }
    Ok(())
}
