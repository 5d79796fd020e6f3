use anyhow::Result;
use spidersearch::{config::Config, server::Server};
use tracing::info;

/// Load the index, bind the socket, and serve until signalled
pub async fn serve(config: Config) -> Result<()> {
    let server = Server::start(config).await?;
    info!("Serving {} indexed pages", server.index().len());
    server.run().await
}
