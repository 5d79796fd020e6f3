//! Query-time search: request validation, ranking, and the response model

mod performer;
mod request;
mod response;

pub use performer::{ScoringMode, SearchPerformer};
pub use request::{canonicalize_query, ClientRequest, RequestError, RequestPayload};
pub use response::{ResultEntry, SearchResponse};
