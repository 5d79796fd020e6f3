//! Listening socket and process configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Search server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory the server changes into at startup (created if missing).
    /// Relative socket and index paths resolve against it.
    pub working_dir: Option<PathBuf>,
    /// Unix socket path the server listens on
    pub socket_path: PathBuf,
    /// Permission bits applied to the socket file after binding
    pub socket_permissions: Option<u32>,
    /// Listen backlog passed to `listen(2)`
    pub listen_backlog: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            working_dir: Some(PathBuf::from("working_dir")),
            socket_path: PathBuf::from("spideriment_search_server.sock"),
            socket_permissions: Some(0o777),
            listen_backlog: 64,
        }
    }
}

impl ServerConfig {
    /// Socket path as seen from the invoking process, before the server has
    /// entered its working directory
    pub fn effective_socket_path(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) if self.socket_path.is_relative() => dir.join(&self.socket_path),
            _ => self.socket_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_socket_resolves_against_working_dir() {
        let cfg = ServerConfig::default();
        assert_eq!(
            cfg.effective_socket_path(),
            PathBuf::from("working_dir/spideriment_search_server.sock")
        );
    }

    #[test]
    fn absolute_socket_is_unchanged() {
        let cfg = ServerConfig {
            socket_path: PathBuf::from("/run/search.sock"),
            ..Default::default()
        };
        assert_eq!(cfg.effective_socket_path(), PathBuf::from("/run/search.sock"));
    }

    #[test]
    fn no_working_dir_keeps_relative_path() {
        let cfg = ServerConfig {
            working_dir: None,
            ..Default::default()
        };
        assert_eq!(cfg.effective_socket_path(), PathBuf::from("spideriment_search_server.sock"));
    }
}
