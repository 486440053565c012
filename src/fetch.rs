//! Thin HTTP client over the node diagnostics API.
//!
//! Every endpoint returns parsed JSON or a [`MonitorError`]; nothing here
//! aggregates or merges. The aggregation core consumes these payloads and the
//! polling loop decides what a failure means (log and skip the cycle).

use crate::error::MonitorError;
use crate::types::{NodeFlags, NodeVersion, ReorgReport, SnapshotFilesList, SnapshotSyncPayload};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Client for one node's diagnostics API.
#[derive(Debug, Clone)]
pub struct DiagnosticsClient {
    client: reqwest::Client,
    base_url: String,
}

impl DiagnosticsClient {
    /// Creates a client for the given diagnostics base URL
    /// (e.g. `http://127.0.0.1:6060/debug/diagnostics`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The snapshot-sync feed: download status, indexing status and the
    /// sync-stage list, all from one consistent backend read.
    pub async fn fetch_snapshot_sync(&self) -> Result<SnapshotSyncPayload, MonitorError> {
        self.get_json("snapshot-sync").await
    }

    /// The list of snapshot files the node knows about.
    pub async fn fetch_snapshot_files_list(&self) -> Result<SnapshotFilesList, MonitorError> {
        self.get_json("snapshot-files-list").await
    }

    /// Node version report (1:1 DTO, no aggregation).
    pub async fn fetch_version(&self) -> Result<NodeVersion, MonitorError> {
        self.get_json("version").await
    }

    /// Flags the node was started with (1:1 DTO, no aggregation).
    pub async fn fetch_flags(&self) -> Result<NodeFlags, MonitorError> {
        self.get_json("flags").await
    }

    /// Reorg scan report (1:1 DTO, no aggregation).
    pub async fn fetch_reorgs(&self) -> Result<ReorgReport, MonitorError> {
        self.get_json("reorgs").await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, MonitorError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 404 {
                return Err(MonitorError::FetchFailed(format!(
                    "Endpoint not found: {} returned 404.\n\
                     This usually means:\n\
                     - The node does not expose the diagnostics API\n\
                     - The diagnostics URL is wrong (expected something like \
                       http://127.0.0.1:6060/debug/diagnostics)\n\
                     - The node version predates this endpoint",
                    url
                )));
            }
            return Err(MonitorError::FetchFailed(format!(
                "Failed to fetch {}: HTTP {}",
                url, status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            MonitorError::FetchFailed(format!("Invalid payload from {}: {}", url, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = DiagnosticsClient::new("http://127.0.0.1:6060/debug/diagnostics/");
        assert_eq!(client.base_url, "http://127.0.0.1:6060/debug/diagnostics");
    }
}
