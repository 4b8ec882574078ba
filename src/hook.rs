// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Pre-move command rendering and execution

use std::io;
use std::process::{Command, Stdio};

/// Placeholder replaced with the name of the tag being moved
pub const OLD_VERSION_TAG: &str = "{oldVersionTag}";

/// Placeholder replaced with a tag already on the target version
pub const NEW_VERSION_TAG: &str = "{newVersionTag}";

/// Runs rendered pre-move commands.
///
/// Execution blocks until the command exits and shares the caller's
/// standard streams.
pub trait HookRunner {
    /// Run `command`, returning its exit code (`None` if killed by a signal)
    fn exec(&mut self, command: &str) -> io::Result<Option<i32>>;
}

impl<H: HookRunner + ?Sized> HookRunner for &mut H {
    fn exec(&mut self, command: &str) -> io::Result<Option<i32>> {
        (**self).exec(command)
    }
}

/// Runs commands through the platform shell
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellHookRunner;

impl HookRunner for ShellHookRunner {
    fn exec(&mut self, command: &str) -> io::Result<Option<i32>> {
        let mut shell = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };

        let status = shell
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.code())
    }
}

/// Substitute the tag placeholders in a command template.
///
/// Every occurrence of each placeholder is replaced, not only the first,
/// so a template may mention the same tag more than once.
#[must_use]
pub fn render_command(template: &str, old_version_tag: &str, new_version_tag: &str) -> String {
    template
        .replace(OLD_VERSION_TAG, old_version_tag)
        .replace(NEW_VERSION_TAG, new_version_tag)
}
