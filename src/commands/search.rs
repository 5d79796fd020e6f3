use anyhow::Result;
use clap::ValueEnum;
use spidersearch::{
    client::{self, ClientError},
    config::Config,
    search::{RequestPayload, SearchResponse},
    util::preview,
};
use tracing::info;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub async fn search_index(
    config: Config,
    query: String,
    max_results: i64,
    quotient: bool,
    format: OutputFormat,
) -> Result<()> {
    info!("Searching for: {}", query);

    let socket_path = config.server.effective_socket_path();
    let payload = RequestPayload {
        search_query: query,
        max_results: i128::from(max_results),
        use_quotient_based_scoring: quotient,
    };

    match client::search(&socket_path, &payload).await {
        Ok(response) => {
            output_search_results(&response, format)?;
            Ok(())
        }
        Err(ClientError::ServerNotRunning) => anyhow::bail!(
            "No search server is listening on {}. Start it with: spidersearch serve",
            socket_path.display()
        ),
        Err(e) => anyhow::bail!("Search failed: {}", e),
    }
}

fn output_search_results(response: &SearchResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Text => {
            println!("\nSearch Results ({} found):\n", response.results.len());
            for (i, result) in response.results.iter().enumerate() {
                println!("{}. [Score: {:.2}] {}", i + 1, result.score, result.title);
                println!("   URL: {}", result.url);
                if !result.content_snippet.is_empty() {
                    println!("   {}", preview(&result.content_snippet, 200));
                }
                println!();
            }
        }
    }
    Ok(())
}
