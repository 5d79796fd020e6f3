//! Web index source configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the web index is loaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Line-delimited JSON file, one crawled page per line
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("web_index.jsonl"),
        }
    }
}
