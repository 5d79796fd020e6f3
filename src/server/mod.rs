//! Server Module
//!
//! The search server owns the loaded index and answers one query per
//! connection over a Unix domain socket.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  spidersearch serve                  │
//! │                                                      │
//! │  ┌────────────────┐      ┌────────────────────────┐  │
//! │  │ Unix Socket    │─────▶│ Connection task        │  │
//! │  │ (accept loop)  │      │ receive → rank → reply │  │
//! │  └────────────────┘      └───────────┬────────────┘  │
//! │                                      │               │
//! │                          ┌───────────┴────────────┐  │
//! │                          │ WebIndex (read-only)   │  │
//! │                          └────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! spidersearch serve
//! spidersearch search "rust programming" --max-results 5
//! ```

pub mod handler;
pub mod lifecycle;
pub mod listener;
pub mod protocol;

pub use handler::{ConnectionError, ConnectionHandler};
pub use lifecycle::{enter_working_dir, Server};
pub use listener::SearchServer;
pub use protocol::{
    decode_header, encode_message, MessageChannel, MessageClass, ProtocolError, HEADER_LEN,
    MAX_MESSAGE_SIZE,
};
