//! Error types for monitoring operations.

use thiserror::Error;

/// Errors that can occur while polling a node's diagnostics API.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// HTTP request error while polling a diagnostics endpoint.
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// General fetch failure (bad status code, unexpected payload shape).
    #[error("Diagnostics fetch failed: {0}")]
    FetchFailed(String),
}
