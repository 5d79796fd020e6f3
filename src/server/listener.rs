//! Server Loop
//!
//! Unix domain socket listener. The loop only accepts and dispatches; every
//! connection is served on its own task with a shared handle to the index.

use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UnixListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::ServerConfig;

use super::handler::ConnectionHandler;

/// Search server listening on a Unix domain socket
pub struct SearchServer {
    socket_path: PathBuf,
    socket_permissions: Option<u32>,
    listen_backlog: u32,
    handler: Arc<ConnectionHandler>,
}

impl SearchServer {
    /// Create a new server
    pub fn new(config: &ServerConfig, handler: Arc<ConnectionHandler>) -> Self {
        Self {
            socket_path: config.socket_path.clone(),
            socket_permissions: config.socket_permissions,
            listen_backlog: config.listen_backlog,
            handler,
        }
    }

    /// Bind the listening socket.
    ///
    /// A stale socket file at the path is removed first; permissions and the
    /// configured backlog are applied after binding.
    pub fn bind(&self) -> Result<UnixListener> {
        match std::fs::remove_file(&self.socket_path) {
            Ok(()) => debug!("Removed stale socket file {}", self.socket_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("Failed to remove existing socket file"),
        }

        let listener = std::os::unix::net::UnixListener::bind(&self.socket_path)
            .with_context(|| {
                format!(
                    "Failed to bind to Unix socket {}",
                    self.socket_path.display()
                )
            })?;

        if let Some(mode) = self.socket_permissions {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.socket_path, std::fs::Permissions::from_mode(mode))
                .context("Failed to set socket permissions")?;
        }

        // std binds with its own backlog; listen again to apply ours.
        // SAFETY: the descriptor is owned by `listener`, which outlives the call.
        let rc = unsafe { libc::listen(listener.as_raw_fd(), self.listen_backlog as libc::c_int) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error()).context("Failed to listen on Unix socket");
        }

        listener
            .set_nonblocking(true)
            .context("Failed to make socket non-blocking")?;
        UnixListener::from_std(listener).context("Failed to register socket with the runtime")
    }

    /// Run the accept loop on an already bound listener
    pub async fn serve(
        &self,
        listener: UnixListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        info!(
            "The server has started; listening on Unix socket {}",
            self.socket_path.display()
        );

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, _addr)) => {
                            let handler = self.handler.clone();
                            let span = info_span!("connection", id = %Uuid::new_v4());
                            tokio::spawn(
                                async move { handler.run(stream).await }.instrument(span),
                            );
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Search server shutting down");
                    break;
                }
            }
        }

        // Clean up socket file
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }

        Ok(())
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::types::WebIndex;
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    fn server_at(path: PathBuf, permissions: Option<u32>) -> SearchServer {
        let handler = Arc::new(ConnectionHandler::new(
            WebIndex::default(),
            Arc::new(ScoringConfig::default()),
        ));
        let config = ServerConfig {
            working_dir: None,
            socket_path: path,
            socket_permissions: permissions,
            listen_backlog: 64,
        };
        SearchServer::new(&config, handler)
    }

    #[tokio::test]
    async fn bind_replaces_stale_socket_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("search.sock");
        std::fs::write(&path, b"stale").unwrap();

        let server = server_at(path.clone(), None);
        let _listener = server.bind().unwrap();
        assert!(std::fs::metadata(&path).unwrap().file_type().is_socket());
    }

    #[tokio::test]
    async fn bind_applies_permissions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("search.sock");

        let server = server_at(path.clone(), Some(0o600));
        let _listener = server.bind().unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn serve_removes_socket_on_shutdown() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("search.sock");
        let server = server_at(path.clone(), None);
        let listener = server.bind().unwrap();

        let (tx, rx) = broadcast::channel(1);
        let task = tokio::spawn(async move { server.serve(listener, rx).await });
        tx.send(()).unwrap();
        task.await.unwrap().unwrap();
        assert!(!path.exists());
    }
}
