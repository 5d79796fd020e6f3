//! Client request validation and query canonicalization

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why an inbound request was rejected. The connection is closed without a reply.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is not a JSON object")]
    NotAnObject,

    #[error("request does not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("max_results must be a positive integer, got {0}")]
    NonPositiveMaxResults(i128),
}

/// Request body as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub search_query: String,
    /// Any JSON integer; values up to `u64::MAX` are representable
    pub max_results: i128,
    pub use_quotient_based_scoring: bool,
}

/// Lowercase, collapse whitespace runs to a single space, and trim.
///
/// The ASCII information separators (U+001C..U+001F) count as whitespace.
pub fn canonicalize_query(query: &str) -> String {
    query
        .to_lowercase()
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// A validated search request. Only constructible from a well-formed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequest {
    canonical_search_query: String,
    max_results: usize,
    use_quotient_based_scoring: bool,
}

impl ClientRequest {
    pub fn new(
        search_query: &str,
        max_results: i128,
        use_quotient_based_scoring: bool,
    ) -> Result<Self, RequestError> {
        if max_results <= 0 {
            return Err(RequestError::NonPositiveMaxResults(max_results));
        }

        Ok(Self {
            canonical_search_query: canonicalize_query(search_query),
            max_results: usize::try_from(max_results).unwrap_or(usize::MAX),
            use_quotient_based_scoring,
        })
    }

    /// Validate a decoded JSON message
    pub fn from_json(value: Value) -> Result<Self, RequestError> {
        if !value.is_object() {
            return Err(RequestError::NotAnObject);
        }
        let payload: RequestPayload = serde_json::from_value(value)?;
        Self::try_from(payload)
    }

    pub fn canonical_search_query(&self) -> &str {
        &self.canonical_search_query
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn use_quotient_based_scoring(&self) -> bool {
        self.use_quotient_based_scoring
    }
}

impl TryFrom<RequestPayload> for ClientRequest {
    type Error = RequestError;

    fn try_from(payload: RequestPayload) -> Result<Self, Self::Error> {
        Self::new(
            &payload.search_query,
            payload.max_results,
            payload.use_quotient_based_scoring,
        )
    }
}
