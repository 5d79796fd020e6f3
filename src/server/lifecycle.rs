//! Server Lifecycle Management
//!
//! Startup (working directory, index load, socket bind) and signal-driven
//! shutdown.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::UnixListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::index::load_index;
use crate::types::WebIndex;

use super::handler::ConnectionHandler;
use super::listener::SearchServer;

/// A fully initialized search server: index loaded and socket bound
pub struct Server {
    server: Arc<SearchServer>,
    listener: UnixListener,
    index: WebIndex,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Server {
    /// Prepare the working directory, load the index, and bind the socket.
    ///
    /// Every failure here is fatal: the server never starts with a partial
    /// index or without its socket.
    pub async fn start(config: Config) -> Result<Self> {
        info!("Starting search server");

        if let Some(dir) = &config.server.working_dir {
            enter_working_dir(dir)?;
        }

        let index = Self::load_index(&config).await?;

        let handler = Arc::new(ConnectionHandler::new(
            index.clone(),
            Arc::new(config.scoring.clone()),
        ));
        let server = SearchServer::new(&config.server, handler);
        let listener = server.bind()?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(16);

        info!("Socket path: {}", server.socket_path().display());

        Ok(Self {
            server: Arc::new(server),
            listener,
            index,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Load the index on the blocking pool
    async fn load_index(config: &Config) -> Result<WebIndex> {
        let path = config.index.path.clone();
        info!("Loading web index from {}", path.display());

        let index = tokio::task::spawn_blocking(move || load_index(&path))
            .await
            .context("Index loading task panicked")??;
        Ok(index)
    }

    /// The loaded index
    pub fn index(&self) -> &WebIndex {
        &self.index
    }

    /// Sender that stops the server when signalled
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Serve until Ctrl+C, SIGTERM, or a shutdown handle fires
    pub async fn run(self) -> Result<()> {
        let Self {
            server,
            listener,
            shutdown_tx,
            shutdown_rx,
            ..
        } = self;

        let shutdown_rx_server = shutdown_tx.subscribe();
        let server_handle = tokio::spawn(async move {
            match server.serve(listener, shutdown_rx_server).await {
                Ok(()) => info!("Accept loop stopped cleanly"),
                Err(e) => error!("Accept loop failed: {}", e),
            }
        });

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
            _ = Self::wait_for_sigterm() => {
                info!("Received SIGTERM, shutting down");
            }
            _ = Self::wait_for_shutdown(shutdown_rx) => {
                info!("Shutdown requested");
            }
        }

        let _ = shutdown_tx.send(());

        let server_abort = server_handle.abort_handle();
        if tokio::time::timeout(Duration::from_secs(5), server_handle).await.is_err() {
            warn!("Accept loop did not stop within 5s, aborting");
            server_abort.abort();
        }

        info!("The server is exiting");
        Ok(())
    }

    /// Wait for SIGTERM signal
    async fn wait_for_sigterm() {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}. Falling back to pending future.", e);
                std::future::pending::<()>().await;
            }
        }
    }

    /// Wait for shutdown signal from broadcast channel
    async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) {
        let _ = rx.recv().await;
    }
}

/// Create `dir` if needed and make it the process working directory
pub fn enter_working_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create working directory {}", dir.display()))?;
    std::env::set_current_dir(dir)
        .with_context(|| format!("Failed to enter working directory {}", dir.display()))?;
    Ok(())
}
