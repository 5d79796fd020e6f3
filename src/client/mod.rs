//! Client Module
//!
//! Client side of the search socket. The CLI's `search` subcommand and the
//! integration tests use this to send one query and read back the ranking.

pub mod connection;

pub use connection::SearchClient;

use std::path::Path;

use thiserror::Error;

use crate::search::{RequestPayload, SearchResponse};

/// Errors that can occur when talking to the search server
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Search server is not running. Start it with: spidersearch serve")]
    ServerNotRunning,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server closes the connection without a reply when it rejects a request
    #[error("The server closed the connection without responding (request rejected)")]
    NoResponse,

    #[error("Unexpected response from search server: {0}")]
    UnexpectedResponse(String),
}

/// Run one query against the server listening at `socket_path`
pub async fn search(
    socket_path: &Path,
    payload: &RequestPayload,
) -> Result<SearchResponse, ClientError> {
    let client = SearchClient::connect_to(socket_path).await?;
    client.search(payload).await
}
