// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types shared by the catalog, rotator and version stores

use thiserror::Error;

/// Failures reported by a version store
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Credentials were rejected or lack the required role
    #[error("permission denied: {0}")]
    Permission(String),
    /// The store does not know the function or version
    #[error("not found in store: {0}")]
    NotFound(String),
    /// Any other store or transport failure
    #[error("store operation failed: {0}")]
    Operation(String),
}

/// Errors that abort a tag rotation
#[derive(Debug, Error)]
pub enum TagError {
    /// Configuration is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),
    /// A tag or version name did not resolve
    #[error("{0}")]
    NotFound(String),
    /// The pre-move command exited unsuccessfully
    #[error("pre-move command failed ({}): {command}", describe_status(.status))]
    HookFailure {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        status: Option<i32>,
    },
    /// The pre-move command could not be started
    #[error("failed to start pre-move command: {command}")]
    HookSpawn {
        /// Rendered command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The version store rejected or failed an operation
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Result alias for tag operations
pub type TagResult<T> = std::result::Result<T, TagError>;
