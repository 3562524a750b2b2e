// Ledger: header history, stores and validation

mod chain;
mod error;
mod store;

pub use chain::{Chain, GENESIS_AMOUNT, GENESIS_SEED, HeaderList, genesis_block};
pub use error::ChainError;
pub use store::{
    BlockStore, MemoryBlockStore, MemoryTxStore, MemoryUtxoStore, TxStore, Utxo, UtxoStore,
};
