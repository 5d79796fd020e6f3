//! Subcommand implementations for the `spidersearch` binary

mod init;
mod search;
mod serve;

pub use init::init_config;
pub use search::{search_index, OutputFormat};
pub use serve::serve;
