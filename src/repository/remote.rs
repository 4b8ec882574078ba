// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! HTTP client for the serverless functions service

use super::{retain_relevant, VersionRepository};
use crate::error::{RemoteError, TagResult};
use crate::types::Version;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

/// Default functions API endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://serverless-functions.api.cloud.yandex.net/functions/v1";

/// Default long-running operations endpoint
pub const DEFAULT_OPERATION_ENDPOINT: &str = "https://operation.api.cloud.yandex.net/operations";

/// Connection settings for [`RemoteRepository`]
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    /// Functions API base URL
    pub endpoint: String,
    /// Operations API base URL
    pub operation_endpoint: String,
    /// Bearer token
    pub token: String,
    /// Folder holding the function
    pub folder_id: String,
    /// Delay between operation polls
    pub poll_interval: Duration,
    /// Maximum number of operation polls
    pub max_polls: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionList {
    #[serde(default)]
    functions: Vec<FunctionInfo>,
}

#[derive(Debug, Deserialize)]
struct FunctionInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionPage {
    #[serde(default)]
    versions: Vec<Version>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    id: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationStatus>,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Version store backed by the functions HTTP API
#[derive(Debug)]
pub struct RemoteRepository {
    client: Client,
    settings: RemoteSettings,
    function_id: String,
}

impl RemoteRepository {
    /// Connect and resolve the id of function `function_name`
    pub fn connect(settings: RemoteSettings, function_name: &str) -> TagResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RemoteError::Operation(format!("failed to build HTTP client: {e}")))?;

        let url = format!("{}/functions", settings.endpoint);
        let filter = format!("name=\"{function_name}\"");
        let list: FunctionList = send(
            client
                .get(&url)
                .bearer_auth(&settings.token)
                .query(&[
                    ("folderId", settings.folder_id.as_str()),
                    ("filter", filter.as_str()),
                ]),
        )?;

        let function_id = list
            .functions
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| RemoteError::NotFound(format!("Function not found: {function_name}")))?;

        tracing::debug!("Resolved function {} to {}", function_name, function_id);

        Ok(Self { client, settings, function_id })
    }

    /// Resolved function id
    #[must_use]
    pub fn function_id(&self) -> &str {
        &self.function_id
    }

    fn wait_operation(&self, operation: Operation) -> TagResult<()> {
        poll_operation(operation, self.settings.max_polls, self.settings.poll_interval, |id| {
            let url = format!("{}/{}", self.settings.operation_endpoint, id);
            send(self.client.get(&url).bearer_auth(&self.settings.token))
        })?;
        Ok(())
    }
}

impl VersionRepository for RemoteRepository {
    fn list(&self, filter: &BTreeSet<String>) -> TagResult<Vec<Version>> {
        tracing::debug!("Loading versions...");
        let url = format!("{}/versions", self.settings.endpoint);
        let versions = collect_pages(|page_token| {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&self.settings.token)
                .query(&[("functionId", self.function_id.as_str())]);
            if let Some(token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }
            send(request)
        })?;

        let versions = retain_relevant(versions, filter);
        tracing::debug!("Loaded versions: {}", versions.len());
        Ok(versions)
    }

    fn set_tag(&mut self, version: &Version, name: &str) -> TagResult<()> {
        let url = format!("{}/versions/{}:setTag", self.settings.endpoint, version.id);
        let operation: Operation = send(
            self.client
                .post(&url)
                .bearer_auth(&self.settings.token)
                .json(&serde_json::json!({ "tag": name })),
        )?;
        self.wait_operation(operation)
    }
}

/// Fetch pages until one comes back without a next page token
fn collect_pages<F>(mut fetch: F) -> Result<Vec<Version>, RemoteError>
where
    F: FnMut(Option<&str>) -> Result<VersionPage, RemoteError>,
{
    let mut versions = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch(page_token.as_deref())?;
        versions.extend(page.versions);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(versions),
        }
    }
}

/// Re-fetch `operation` until it is done, at most `max_polls` times
fn poll_operation<F>(
    mut operation: Operation,
    max_polls: u32,
    interval: Duration,
    mut fetch: F,
) -> Result<(), RemoteError>
where
    F: FnMut(&str) -> Result<Operation, RemoteError>,
{
    let mut polls = 0;
    while !operation.done {
        if polls >= max_polls {
            return Err(RemoteError::Operation(format!(
                "operation {} did not finish after {} polls",
                operation.id, polls
            )));
        }
        thread::sleep(interval);
        polls += 1;
        operation = fetch(&operation.id)?;
    }

    match operation.error {
        Some(status) => Err(operation_error(&status)),
        None => Ok(()),
    }
}

fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
    let response = request
        .send()
        .map_err(|e| RemoteError::Operation(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(status_error(status, body.trim()));
    }

    response
        .json()
        .map_err(|e| RemoteError::Operation(format!("invalid response body: {e}")))
}

fn status_error(status: StatusCode, body: &str) -> RemoteError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Permission(detail),
        StatusCode::NOT_FOUND => RemoteError::NotFound(detail),
        _ => RemoteError::Operation(detail),
    }
}

// gRPC status codes as reported inside finished operations
fn operation_error(status: &OperationStatus) -> RemoteError {
    let detail = format!("code {}: {}", status.code, status.message);
    match status.code {
        5 => RemoteError::NotFound(detail),
        7 | 16 => RemoteError::Permission(detail),
        _ => RemoteError::Operation(detail),
    }
}
