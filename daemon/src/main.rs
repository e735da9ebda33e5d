//! BURST daemon — entry point for running a BURST node.

use std::path::PathBuf;
use std::sync::Arc;

use burst_node::{CoreConfig, LogFormat};
use burst_types::NetworkId;
use clap::Parser;

#[derive(Parser)]
#[command(name = "burst-daemon", about = "BURST protocol node daemon")]
struct Cli {
    /// Path to a JSON configuration file. Falls back to built-in defaults
    /// overridden by the flags below when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Network to connect to.
    #[arg(long, default_value = "dev")]
    network: String,

    /// Data directory for ledger storage.
    #[arg(long, default_value = "./burst_data")]
    data_dir: PathBuf,

    /// Peering port for P2P connections.
    #[arg(long)]
    peering_port: Option<u16>,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human")]
    log_format: String,

    /// Log level filter.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Start the node.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
}

#[derive(clap::Subcommand)]
enum NodeAction {
    /// Run the node.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CoreConfig::from_json_file(path)?,
        None => CoreConfig::default(),
    };
    config.network = match cli.network.as_str() {
        "live" => NetworkId::Live,
        "test" => NetworkId::Test,
        _ => NetworkId::Dev,
    };
    config.data_dir = cli.data_dir;
    if let Some(port) = cli.peering_port {
        config.peering_port = port;
    }
    config.log_format = cli.log_format;
    config.log_level = cli.log_level;

    let log_format = if config.log_format == "json" {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    burst_node::init_logging(log_format, &config.log_level);

    match cli.command {
        Command::Node { action } => match action {
            NodeAction::Run => {
                tracing::info!(network = %config.network.as_str(), "starting BURST node");
                let node = Arc::new(burst_node::BurstNode::new(config).await?);
                node.start().await;
                node.shutdown.wait_for_signal().await;
                node.shutdown().await;
            }
        },
    }

    Ok(())
}
