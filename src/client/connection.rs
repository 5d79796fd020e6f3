//! Client Connection
//!
//! Handles the Unix socket connection to the search server.

use std::path::Path;

use tokio::net::UnixStream;
use tracing::debug;

use crate::search::{RequestPayload, SearchResponse};
use crate::server::{MessageChannel, MessageClass, ProtocolError};

use super::ClientError;

/// Client connection to the search server. Each connection carries one query.
pub struct SearchClient {
    channel: MessageChannel<UnixStream>,
}

impl SearchClient {
    /// Connect to the server at a specific socket path
    pub async fn connect_to(socket_path: &Path) -> Result<Self, ClientError> {
        debug!("Connecting to search server at: {}", socket_path.display());

        let stream = UnixStream::connect(socket_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound
                || e.kind() == std::io::ErrorKind::ConnectionRefused
            {
                ClientError::ServerNotRunning
            } else {
                ClientError::ConnectionFailed(e.to_string())
            }
        })?;

        debug!("Connected to search server");
        Ok(Self {
            channel: MessageChannel::new(stream),
        })
    }

    /// Send the query and wait for the ranked results.
    ///
    /// Consumes the client: the server closes the connection after replying.
    pub async fn search(mut self, payload: &RequestPayload) -> Result<SearchResponse, ClientError> {
        self.channel
            .send_json(payload, MessageClass::Request)
            .await
            .map_err(|e| ClientError::RequestFailed(format!("Failed to send request: {}", e)))?;

        let (value, class) = match self.channel.receive_json().await {
            Ok(message) => message,
            Err(ProtocolError::ConnectionClosed) => return Err(ClientError::NoResponse),
            Err(e) => {
                return Err(ClientError::RequestFailed(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        };

        if class != MessageClass::Response {
            return Err(ClientError::UnexpectedResponse(format!(
                "message class {:?}",
                class
            )));
        }

        serde_json::from_value(value).map_err(|e| ClientError::UnexpectedResponse(e.to_string()))
    }
}
