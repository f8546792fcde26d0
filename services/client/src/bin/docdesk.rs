//! services/client/src/bin/docdesk.rs

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docdesk_core::preview::PreviewRegistry;
use docdesk_core::sessions::{QuerySession, SharingSession};
use docdesk_lib::{
    adapters::{HttpQueryAdapter, PinataAdapter},
    config::Config,
    error::ClientError,
    terminal,
};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docdesk", version, about = "Chat with a PDF or share files through a pinning gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a document and ask questions about it, one per line
    Query {
        /// The document to upload (PDF expected)
        file: PathBuf,
    },
    /// Pin one or more files and print their shareable links
    Share {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded.");

    // --- 2. Shared HTTP client and preview registry ---
    let http = reqwest::Client::builder()
        .user_agent(concat!("docdesk/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let previews = PreviewRegistry::new();
    let mut stdout = std::io::stdout();

    // --- 3. Run the selected view ---
    match cli.command {
        Command::Query { file } => {
            let adapter = HttpQueryAdapter::new(http, &config.query_api_url);
            let mut session = QuerySession::new(previews.clone());

            terminal::attach(&mut session, &adapter, &file, &mut stdout).await?;
            let stdin = BufReader::new(tokio::io::stdin());
            terminal::run_query(&mut session, &adapter, stdin, &mut stdout).await?;
        }
        Command::Share { files } => {
            let (api_key, secret_key) = config.pinata_credentials()?;
            let adapter = PinataAdapter::new(
                http,
                config.pinning_url.clone(),
                config.gateway_url.clone(),
                api_key,
                secret_key,
            );
            let mut session = SharingSession::new(previews.clone());

            terminal::run_share(&mut session, &adapter, &files, &mut stdout).await?;
        }
    }

    info!(live_previews = previews.live_count(), "Session finished");
    Ok(())
}
