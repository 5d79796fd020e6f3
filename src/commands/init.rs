use anyhow::{Context, Result};
use spidersearch::config::{Config, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

/// Write a configuration file with every default spelled out
pub async fn init_config(path: PathBuf) -> Result<()> {
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("Refusing to overwrite existing {}", config_path.display());
    }

    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;
    let toml_content = Config::default().to_toml_document()?;
    std::fs::write(&config_path, toml_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
