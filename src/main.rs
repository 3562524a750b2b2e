// picochain - node entry point

use clap::Parser;
use picochain::chain::{Chain, MemoryBlockStore, MemoryTxStore};
use picochain::cli::{Cli, Commands, resolve_config};
use picochain::config::NodeConfig;
use picochain::crypto::PrivateKey;
use picochain::network::Node;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start {
            config,
            listen,
            bootstrap,
            validator_seed,
            node_version,
        } => match resolve_config(config, listen, bootstrap, validator_seed, node_version) {
            Ok(cfg) => run(cfg).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cfg: NodeConfig) -> Result<(), String> {
    let private_key = match &cfg.validator_seed {
        Some(seed) => Some(PrivateKey::from_seed_hex(seed)?),
        None => None,
    };

    let chain = Arc::new(Chain::new(
        Box::new(MemoryBlockStore::new()),
        Box::new(MemoryTxStore::new()),
    ));

    let node = Arc::new(Node::new(
        cfg.version,
        cfg.listen_addr,
        private_key,
        chain,
    ));

    node.start(cfg.bootstrap).await
}
