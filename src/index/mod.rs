//! Web index loading
//!
//! The index is read once at startup from a line-delimited JSON file produced
//! by the crawler. Every line is one page record:
//!
//! ```text
//! {"final_url": "...", "title": "...", "headings": {"h1": ["..."], "h2": [...]},
//!  "description": "...", "keywords": "...", "author": "...",
//!  "content_snippet": "...", "content_snippet_quality": 0.8,
//!  "image_alts": "...", "link_texts": "..."}
//! ```
//!
//! Any malformed record aborts the load; the server never starts on a
//! partially loaded index.

mod loader;
mod record;

pub use loader::{load_index, read_index};
pub use record::parse_heading_level;

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error while loading the web index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read web index '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("web index line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: RecordError,
    },
}

/// Problem with a single index record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("key '{key}' cannot be read as {expected}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },

    #[error("a page heading's level is saved incorrectly: '{0}' (expected h1-h6)")]
    InvalidHeadingLevel(String),
}
