// CLI commands

use crate::config::NodeConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "picochain")]
#[command(about = "Minimal peer-to-peer UTXO ledger node", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a node
    Start {
        /// JSON configuration file; flags below override its values
        #[arg(long)]
        config: Option<String>,

        /// Address to listen on
        #[arg(long)]
        listen: Option<String>,

        /// Bootstrap peer address (repeatable)
        #[arg(long)]
        bootstrap: Vec<String>,

        /// Hex seed of the validator key; enables block production
        #[arg(long)]
        validator_seed: Option<String>,

        /// Version string advertised in handshakes
        #[arg(long)]
        node_version: Option<String>,
    },
}

/// Merge config file and CLI flags into one node configuration
pub fn resolve_config(
    config: Option<String>,
    listen: Option<String>,
    bootstrap: Vec<String>,
    validator_seed: Option<String>,
    node_version: Option<String>,
) -> Result<NodeConfig, String> {
    let mut cfg = match config {
        Some(path) => NodeConfig::from_file(&path)?,
        None => {
            let listen_addr = listen
                .clone()
                .ok_or("either --config or --listen is required")?;
            NodeConfig::new(listen_addr)
        }
    };

    if let Some(listen_addr) = listen {
        cfg.listen_addr = listen_addr;
    }
    if !bootstrap.is_empty() {
        cfg.bootstrap = bootstrap;
    }
    if let Some(seed) = validator_seed {
        cfg.validator_seed = Some(seed);
    }
    if let Some(version) = node_version {
        cfg.version = version;
    }

    Ok(cfg)
}
