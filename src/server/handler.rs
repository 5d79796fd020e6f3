//! Connection Handler
//!
//! Each accepted connection goes through exactly one pass of
//! receive → validate/score → respond → close. A failure in any step ends the
//! connection without a reply; the client only observes the socket closing.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::config::ScoringConfig;
use crate::search::{ClientRequest, RequestError, SearchPerformer, SearchResponse};
use crate::types::WebIndex;

use super::protocol::{MessageChannel, MessageClass, ProtocolError};

/// Reasons a connection is terminated early
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("transport error: {0}")]
    Transport(#[from] ProtocolError),

    #[error("closing connection: {0}")]
    Close(String),
}

impl From<RequestError> for ConnectionError {
    fn from(e: RequestError) -> Self {
        Self::Close(e.to_string())
    }
}

/// Serves single-request connections against a shared, read-only index
pub struct ConnectionHandler {
    index: WebIndex,
    scoring: Arc<ScoringConfig>,
}

impl ConnectionHandler {
    pub fn new(index: WebIndex, scoring: Arc<ScoringConfig>) -> Self {
        Self { index, scoring }
    }

    /// Handle one connection to completion. The stream is always closed.
    pub async fn run<S>(&self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut channel = MessageChannel::new(stream);

        match self.handle_client(&mut channel).await {
            Ok(()) => trace!("Connection served"),
            Err(e) => debug!("Connection dropped: {}", e),
        }

        if let Err(e) = channel.shutdown().await {
            trace!("Ignoring error while closing connection: {}", e);
        }
    }

    async fn handle_client<S>(&self, channel: &mut MessageChannel<S>) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let request = self.receive_request(channel).await?;
        let response = self.handle_request(request).await?;
        channel.send_json(&response, MessageClass::Response).await?;
        Ok(())
    }

    async fn receive_request<S>(
        &self,
        channel: &mut MessageChannel<S>,
    ) -> Result<ClientRequest, ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (message, class) = channel.receive_json().await?;
        if class != MessageClass::Request {
            return Err(ConnectionError::Close(format!(
                "the client sent a message with an invalid message class ({:?})",
                class
            )));
        }
        Ok(ClientRequest::from_json(message)?)
    }

    /// Rank the index for `request` on the blocking pool.
    ///
    /// The scan is CPU-bound, so it runs off the async workers to keep other
    /// connections and the accept loop responsive.
    pub async fn handle_request(
        &self,
        request: ClientRequest,
    ) -> Result<SearchResponse, ConnectionError> {
        let index = self.index.clone();
        let scoring = self.scoring.clone();
        let start = Instant::now();

        let response = tokio::task::spawn_blocking(move || {
            let results = SearchPerformer::new(&index, &scoring).perform_search(&request);
            SearchResponse::from_results(&results)
        })
        .await
        .map_err(|e| ConnectionError::Close(format!("ranking task failed: {}", e)))?;

        debug!(
            "Ranked {} items in {:?}, returning {} results",
            self.index.len(),
            start.elapsed(),
            response.results.len()
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WebIndexItem;
    use serde_json::json;
    use tokio::io::AsyncReadExt;

    fn test_handler() -> ConnectionHandler {
        let item = WebIndexItem::from_json(&json!({
            "final_url": "https://rust.example",
            "title": "Rust Programming Guide",
            "headings": {},
            "description": "",
            "keywords": "",
            "author": "",
            "content_snippet": "All about Rust",
            "content_snippet_quality": 1.0,
            "image_alts": "",
            "link_texts": ""
        }))
        .unwrap();
        ConnectionHandler::new(WebIndex::new(vec![item]), Arc::new(ScoringConfig::default()))
    }

    #[tokio::test]
    async fn serves_one_request_then_closes() {
        let handler = test_handler();
        let (client, server) = tokio::io::duplex(4096);
        let serve = tokio::spawn(async move { handler.run(server).await });

        let mut channel = MessageChannel::new(client);
        channel
            .send_json(
                &json!({
                    "search_query": "RUST",
                    "max_results": 3,
                    "use_quotient_based_scoring": false
                }),
                MessageClass::Request,
            )
            .await
            .unwrap();
        let (value, class) = channel.receive_json().await.unwrap();
        assert_eq!(class, MessageClass::Response);
        let response: SearchResponse = serde_json::from_value(value).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].title, "Rust Programming Guide");
        // title + url + snippet
        assert_eq!(response.results[0].score, 20000.0 + 2000.0 + 100.0);

        serve.await.unwrap();
        assert!(matches!(
            channel.receive_json().await,
            Err(ProtocolError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn invalid_request_gets_no_response() {
        let handler = test_handler();
        let (client, server) = tokio::io::duplex(4096);
        let serve = tokio::spawn(async move { handler.run(server).await });

        let mut channel = MessageChannel::new(client);
        channel
            .send_json(
                &json!({
                    "search_query": "rust",
                    "max_results": 0,
                    "use_quotient_based_scoring": false
                }),
                MessageClass::Request,
            )
            .await
            .unwrap();
        serve.await.unwrap();

        let mut rest = Vec::new();
        let mut stream = channel.into_inner();
        stream.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn wrong_message_class_gets_no_response() {
        let handler = test_handler();
        let (client, server) = tokio::io::duplex(4096);
        let serve = tokio::spawn(async move { handler.run(server).await });

        let mut channel = MessageChannel::new(client);
        channel
            .send_json(
                &json!({
                    "search_query": "rust",
                    "max_results": 1,
                    "use_quotient_based_scoring": false
                }),
                MessageClass::Response,
            )
            .await
            .unwrap();
        serve.await.unwrap();

        let mut rest = Vec::new();
        channel.into_inner().read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn handle_request_is_bounded_by_max_results() {
        let handler = test_handler();
        let request = ClientRequest::new("rust", 1, true).unwrap();
        let response = handler.handle_request(request).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert!(response.results[0].score >= 1.0);
    }
}
