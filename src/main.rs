//! carbonlink - command-line front end for the carbon capture network API

use clap::Parser;
use tracing_subscriber::EnvFilter;

use carbonlink::cli::{self, Cli};
use carbonlink::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(app = APP_NAME, version = APP_VERSION, "Launching");

    cli::run(cli).await
}
