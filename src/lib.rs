// picochain - a minimal peer-to-peer UTXO ledger node

pub mod chain;
pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod network;

// Re-exports for convenience
pub use chain::{Chain, ChainError, MemoryBlockStore, MemoryTxStore, MemoryUtxoStore, Utxo};
pub use config::NodeConfig;
pub use core::{Block, Header, Transaction, TxInput, TxOutput};
pub use crypto::{Address, PrivateKey, PublicKey, Signature};
pub use network::{Mempool, Message, Node, PeerClient, Version};
