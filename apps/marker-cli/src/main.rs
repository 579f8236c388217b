//! PDF Marker CLI
//!
//! Entry point for exporting, rendering and submitting page markers.

mod cli;
mod commands;

use clap::Parser;
use marker_client::{ApiClient, ApiConfig};
use marker_core::DirectoryDownloader;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let downloader = DirectoryDownloader::new(&cli.out_dir);

    match cli.command {
        Command::Export {
            annotations,
            document,
            settings,
        } => {
            let settings = settings.resolve()?;
            let filename = commands::export(&annotations, &document, &settings, &downloader)?;
            tracing::info!("Saved {}", downloader.dir().join(&filename).display());
        }
        Command::Render {
            document,
            annotations,
            output,
            settings,
        } => {
            let settings = settings.resolve()?;
            let filename = commands::render(
                &document,
                &annotations,
                output.as_deref(),
                settings,
                &downloader,
            )
            .await?;
            tracing::info!("Saved {}", downloader.dir().join(&filename).display());
        }
        Command::Submit { data, pdf_path } => {
            let client = api_client(cli.api_url)?;
            let response = commands::submit(&client, &data, &pdf_path).await?;
            print_json(&response)?;
        }
        Command::List { directory } => {
            let client = api_client(cli.api_url)?;
            let response = commands::list(&client, &directory).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}

fn api_client(api_url: Option<String>) -> anyhow::Result<ApiClient> {
    let config = ApiConfig::from_env_value(api_url);
    tracing::info!("Backend: {}", config.base_url);
    Ok(ApiClient::new(config)?)
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
