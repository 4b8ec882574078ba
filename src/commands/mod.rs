// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod move_tag;
pub mod tags;
pub mod versions;

use crate::catalog::TagCatalog;
use crate::config::{self, Config, StoreConfig};
use crate::repository::remote::RemoteSettings;
use crate::repository::{FileRepository, RemoteRepository, VersionRepository};
use crate::types::{format_version, Version};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;
use tracing::Span;

/// How command output is rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print JSON instead of text
    pub json: bool,
    /// Colorize text output
    pub color: bool,
}

/// Per-invocation state shared by the commands
pub struct Session {
    /// Loaded configuration
    pub config: Config,
    /// Tags built from the configuration
    pub catalog: TagCatalog,
    /// Root span for this invocation's log events
    pub span: Span,
}

impl Session {
    /// Load configuration and build the tag catalog
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = config::load(config_path).context("Failed to load configuration")?;
        let catalog = TagCatalog::build(config.tags.as_deref())
            .context("Failed to build tag catalog")?;
        let span = tracing::info_span!("tagshift", function = %config.function_name);

        Ok(Self { config, catalog, span })
    }

    /// Open the configured version store
    pub fn open_store(&self) -> Result<Box<dyn VersionRepository>> {
        let function_name = &self.config.function_name;
        match &self.config.store {
            StoreConfig::Local { path } => {
                let path = path
                    .clone()
                    .unwrap_or_else(|| config::data_dir().join(format!("{function_name}.json")));
                let repo = FileRepository::open(&path)
                    .with_context(|| format!("Failed to open local store {}", path.display()))?;
                Ok(Box::new(repo))
            }
            StoreConfig::Remote { token, .. } => {
                let store = &self.config.store;
                let settings = RemoteSettings {
                    endpoint: store.endpoint().unwrap_or_default().to_string(),
                    operation_endpoint: store.operation_endpoint().unwrap_or_default().to_string(),
                    token: token.clone(),
                    folder_id: self.config.resolve_folder_id()?.to_string(),
                    poll_interval: Duration::from_secs(1),
                    max_polls: 180,
                };
                let repo = RemoteRepository::connect(settings, function_name)
                    .with_context(|| format!("Failed to connect to function \"{function_name}\""))?;
                Ok(Box::new(repo))
            }
        }
    }

    /// List the versions carrying any managed tag
    pub fn list_versions(&self, store: &dyn VersionRepository) -> Result<Vec<Version>> {
        store
            .list(&self.catalog.filtering_names())
            .context("Failed to list versions")
    }
}

/// Print versions one per line, or as a JSON array
pub(crate) fn print_versions(versions: &[Version], output: Output) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(versions)?);
        return Ok(());
    }

    for version in versions {
        let line = format_version(version);
        if output.color {
            let (id, tags) = line.split_once("  ").unwrap_or((line.as_str(), ""));
            println!("{}  {}", id.bold(), tags.green());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}
