//! sealbox - interactive client for the Sealbox mailbox server.

use clap::Parser;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::info;

use sealbox_client::{ClientConfig, Reactor, TerminalConsole};
use sealbox_core::KeyPair;

const BANNER: &str = r#"
 ___  ___   _   _    ___  _____  __
/ __|| __| / \ | |  | _ )/ _ \ \/ /
\__ \| _| / _ \| |__| _ \ (_) >  <
|___/|___/_/ \_\____|___/\___/_/\_\
"#;

#[derive(Parser)]
#[command(author, version, about = "Sealbox encrypted messaging client", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Server host (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// RSA modulus size in bits (overrides the config file)
    #[arg(short, long)]
    bits: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = load_configuration(&cli)?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(bits) = cli.bits {
        config.modulus_bits = bits;
    }

    println!("{BANNER}");

    info!(bits = config.modulus_bits, "generating RSA key pair");
    let keys = KeyPair::generate(config.modulus_bits)?;

    let stream = TcpStream::connect(config.server_addr()).await?;
    info!(addr = %config.server_addr(), "connected");

    let (read_half, write_half) = stream.into_split();
    let reactor = Reactor::new(
        BufReader::new(read_half),
        write_half,
        TerminalConsole::new(),
        keys,
    )?;
    reactor.run().await?;

    info!("disconnected");
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

fn load_configuration(cli: &Cli) -> anyhow::Result<ClientConfig> {
    match &cli.config {
        Some(path) => {
            info!(path, "loading configuration");
            Ok(ClientConfig::load_from_file(path)?)
        }
        None => Ok(ClientConfig::default()),
    }
}
