// Minimal host for the image grabber.
//
// Reads rendered content from a file or stdin, runs one augmentation pass
// and prints the result.

use anyhow::{Context, Result};
use autoimage::{GrabberConfig, augment_content};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[derive(Debug, Parser)]
#[command(name = "autoimage", version, about = "Prepend a linked page's main image to content")]
struct Cli {
    /// Content file; reads stdin when omitted
    content: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL for relative destination links
    #[arg(long)]
    site_url: Option<String>,

    /// Treat the content as part of a listing (skips augmentation unless
    /// the configuration disables the single-view guard)
    #[arg(long)]
    list_view: bool,
}

async fn read_content(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read content {}", path.display())),
        None => {
            let mut content = String::new();
            tokio::io::stdin()
                .read_to_string(&mut content)
                .await
                .context("Failed to read content from stdin")?;
            Ok(content)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GrabberConfig::load(path).await?,
        None => GrabberConfig::default(),
    };
    if let Some(site_url) = cli.site_url {
        config = config.with_site_url(site_url)?;
    }

    let content = read_content(cli.content.as_ref()).await?;
    let output = augment_content(&content, &config, !cli.list_view).await;
    println!("{output}");

    Ok(())
}
