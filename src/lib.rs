//! spidersearch: ranked keyword search over a crawled web index
//!
//! A long-running server that loads a JSON-lines web index into memory once
//! and answers one query per Unix socket connection:
//! - Fixed-weight, field-aware ranking with an optional length-normalized mode
//! - Length-prefixed JSON framing on a local socket
//! - Strict request validation; rejected requests are closed without a reply

pub mod client;
pub mod config;
pub mod index;
pub mod search;
pub mod server;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
