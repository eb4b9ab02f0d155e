//! sealboxd - the Sealbox mailbox server.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use sealbox_server::{Dispatcher, MailboxRegistry, ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Sealbox encrypted mailbox server", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Address to bind (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = load_configuration(&cli)?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!(addr = %config.listen_addr(), "server started");

    let registry = Arc::new(MailboxRegistry::new());
    Dispatcher::new(listener, registry).run().await?;
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn load_configuration(cli: &Cli) -> anyhow::Result<ServerConfig> {
    match &cli.config {
        Some(path) => {
            info!(path, "loading configuration");
            Ok(ServerConfig::load_from_file(path)?)
        }
        None => Ok(ServerConfig::default()),
    }
}
