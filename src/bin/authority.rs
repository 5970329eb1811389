//! Headless authoritative host.
//!
//! Owns the only trusted copy of the game and serves it over TCP. Settings
//! come from `CHAIN_REACTION_*` environment variables; flags override them.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chain_reaction::adapter::{run_authority, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "chain-reaction-authority", version, about = "Authoritative chain reaction host")]
struct Args {
    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// TCP port (0 picks a free port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Seats at the table (2 to 8)
    #[arg(long)]
    players: Option<usize>,

    /// Keep everyone in the game until each player has moved once
    #[arg(long)]
    full_round: bool,

    /// Append every wire line to this JSONL file
    #[arg(long)]
    wire_log: Option<String>,

    /// Show debug logs unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(players) = self.players {
            config.players = players;
        }
        if self.full_round {
            config.full_round = true;
        }
        if self.wire_log.is_some() {
            config.log_path = self.wire_log;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.apply(ServerConfig::from_env());
    run_authority(config, None).await
}
