// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management

use crate::error::{TagError, TagResult};
use crate::repository::remote::{DEFAULT_ENDPOINT, DEFAULT_OPERATION_ENDPOINT};
use crate::types::TagEntry;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Config file looked up when none is given
pub const DEFAULT_CONFIG_STEM: &str = "deploy.config";

/// Extensions tried, in order, when the config path has none of them
pub const CONFIG_EXTENSIONS: &[&str] = &["toml", "json", "yaml"];

/// Prefix of environment variables overriding config keys
pub const ENV_PREFIX: &str = "TAGSHIFT";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Function whose versions are managed
    pub function_name: String,
    /// Tag definitions
    #[serde(default)]
    pub tags: Option<Vec<TagEntry>>,
    /// Where versions are read from and tags written to
    #[serde(default)]
    pub store: StoreConfig,
    /// Folder holding the function, used when the store names none
    #[serde(default)]
    pub folder_id: Option<String>,
}

impl Config {
    /// Folder for the remote store: its own `folder_id`, else the top-level one
    pub fn resolve_folder_id(&self) -> TagResult<&str> {
        let own = match &self.store {
            StoreConfig::Remote { folder_id, .. } => folder_id.as_deref(),
            StoreConfig::Local { .. } => None,
        };
        own.or(self.folder_id.as_deref())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| TagError::Config("remote store requires folder_id".into()))
    }
}

/// Version store selection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// JSON file on disk
    Local {
        /// Store file; defaults to `<data dir>/<function>.json`
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Functions HTTP API
    Remote {
        /// Functions API base URL
        #[serde(default)]
        endpoint: Option<String>,
        /// Operations API base URL
        #[serde(default)]
        operation_endpoint: Option<String>,
        /// Bearer token
        token: String,
        /// Folder holding the function; falls back to the top-level `folder_id`
        #[serde(default)]
        folder_id: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Local { path: None }
    }
}

impl StoreConfig {
    /// Functions API base URL for a remote store
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Remote { endpoint, .. } => {
                Some(endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))
            }
            Self::Local { .. } => None,
        }
    }

    /// Operations API base URL for a remote store
    #[must_use]
    pub fn operation_endpoint(&self) -> Option<&str> {
        match self {
            Self::Remote { operation_endpoint, .. } => {
                Some(operation_endpoint.as_deref().unwrap_or(DEFAULT_OPERATION_ENDPOINT))
            }
            Self::Local { .. } => None,
        }
    }
}

/// Candidate files for a config path.
///
/// A path already ending in a supported extension is used as is; any
/// other path gets each supported extension appended in turn.
#[must_use]
pub fn candidates(path: Option<&Path>) -> Vec<PathBuf> {
    let base = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_STEM));

    let supported = base
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext));
    if supported {
        return vec![base.to_path_buf()];
    }

    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut name = OsString::from(base.as_os_str());
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        })
        .collect()
}

/// Load configuration from the first existing candidate file, with
/// `TAGSHIFT_*` environment overrides (`__` separates nested keys)
pub fn load(path: Option<&Path>) -> TagResult<Config> {
    let candidates = candidates(path);
    let file = candidates.iter().find(|p| p.exists()).ok_or_else(|| {
        let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        TagError::Config(format!("config file not found: {}", tried.join(", ")))
    })?;

    tracing::debug!("Loading config from {}", file.display());

    let settings = config::Config::builder()
        .add_source(config::File::from(file.as_path()))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(|e| TagError::Config(format!("failed to read {}: {e}", file.display())))?;

    let config: Config = settings
        .try_deserialize()
        .map_err(|e| TagError::Config(format!("failed to parse {}: {e}", file.display())))?;

    if config.function_name.trim().is_empty() {
        return Err(TagError::Config("empty function_name".into()));
    }
    if matches!(config.store, StoreConfig::Remote { .. }) {
        config.resolve_folder_id()?;
    }
    Ok(config)
}

/// Directory holding local version stores
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TAGSHIFT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("org", "hyperpolymath", "tagshift")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".tagshift")
        })
}
