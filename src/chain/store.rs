// Ledger stores
//
// Three interchangeable key-value stores: blocks and transactions keyed by
// the lowercase hex of their canonical hash, UTXOs by "<tx-hash>_<index>".
// The in-memory implementations back each by a map behind a read/write lock;
// a durable implementation only has to satisfy the same trait contract.

use crate::chain::ChainError;
use crate::core::{Block, Transaction, hash_block, hash_transaction};
use std::collections::HashMap;
use std::sync::RwLock;

/// Block storage keyed by block hash
pub trait BlockStore: Send + Sync {
    fn put(&self, block: &Block) -> Result<(), ChainError>;
    fn get(&self, hash: &str) -> Result<Block, ChainError>;
}

/// Transaction storage keyed by transaction hash
pub trait TxStore: Send + Sync {
    fn put(&self, tx: &Transaction) -> Result<(), ChainError>;
    fn get(&self, hash: &str) -> Result<Transaction, ChainError>;
}

/// One spendable (or spent) transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Hex hash of the producing transaction
    pub tx_hash: String,
    /// Output index within that transaction
    pub out_index: u32,
    pub amount: u64,
    pub spent: bool,
}

impl Utxo {
    /// Store key for a (transaction hash, output index) pair
    pub fn key_for(tx_hash: &str, out_index: u32) -> String {
        format!("{}_{}", tx_hash, out_index)
    }

    /// Store key of this UTXO
    pub fn key(&self) -> String {
        Self::key_for(&self.tx_hash, self.out_index)
    }
}

/// UTXO storage keyed by `Utxo::key`
pub trait UtxoStore: Send + Sync {
    fn put(&self, utxo: Utxo) -> Result<(), ChainError>;
    fn get(&self, key: &str) -> Result<Utxo, ChainError>;
}

/// In-memory block store
#[derive(Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<String, Block>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockStore for MemoryBlockStore {
    fn put(&self, block: &Block) -> Result<(), ChainError> {
        let hash = hash_block(block).to_hex();
        self.blocks
            .write()
            .expect("block store lock poisoned")
            .insert(hash, block.clone());
        Ok(())
    }

    fn get(&self, hash: &str) -> Result<Block, ChainError> {
        self.blocks
            .read()
            .expect("block store lock poisoned")
            .get(hash)
            .cloned()
            .ok_or_else(|| ChainError::BlockNotFound(hash.to_string()))
    }
}

/// In-memory transaction store
#[derive(Default)]
pub struct MemoryTxStore {
    txs: RwLock<HashMap<String, Transaction>>,
}

impl MemoryTxStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TxStore for MemoryTxStore {
    fn put(&self, tx: &Transaction) -> Result<(), ChainError> {
        let hash = hash_transaction(tx).to_hex();
        self.txs
            .write()
            .expect("tx store lock poisoned")
            .insert(hash, tx.clone());
        Ok(())
    }

    fn get(&self, hash: &str) -> Result<Transaction, ChainError> {
        self.txs
            .read()
            .expect("tx store lock poisoned")
            .get(hash)
            .cloned()
            .ok_or_else(|| ChainError::TxNotFound(hash.to_string()))
    }
}

/// In-memory UTXO store
#[derive(Default)]
pub struct MemoryUtxoStore {
    utxos: RwLock<HashMap<String, Utxo>>,
}

impl MemoryUtxoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UtxoStore for MemoryUtxoStore {
    fn put(&self, utxo: Utxo) -> Result<(), ChainError> {
        self.utxos
            .write()
            .expect("utxo store lock poisoned")
            .insert(utxo.key(), utxo);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Utxo, ChainError> {
        self.utxos
            .read()
            .expect("utxo store lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| ChainError::UtxoNotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Hash256, Header, TxInput, TxOutput};

    #[test]
    fn test_block_store_round_trip() {
        let store = MemoryBlockStore::new();
        let block = Block::new(
            Header::new(1, Hash256::zero(), Hash256::zero(), 0, 0),
            vec![],
        );

        store.put(&block).unwrap();
        let hash = hash_block(&block).to_hex();
        assert_eq!(store.get(&hash).unwrap(), block);
    }

    #[test]
    fn test_block_store_not_found() {
        let store = MemoryBlockStore::new();
        let missing = Hash256::new([7; 32]).to_hex();
        assert_eq!(
            store.get(&missing),
            Err(ChainError::BlockNotFound(missing.clone()))
        );
    }

    #[test]
    fn test_tx_store_round_trip() {
        let store = MemoryTxStore::new();
        let tx = Transaction::new(
            vec![TxInput::new(Hash256::new([1; 32]), 0, vec![1; 32])],
            vec![TxOutput::new(10, vec![2; 20])],
        );

        store.put(&tx).unwrap();
        let hash = hash_transaction(&tx).to_hex();
        assert_eq!(store.get(&hash).unwrap(), tx);
    }

    #[test]
    fn test_utxo_store_key_and_spend_flag() {
        let store = MemoryUtxoStore::new();
        let utxo = Utxo {
            tx_hash: "ab".repeat(32),
            out_index: 1,
            amount: 500,
            spent: false,
        };
        let key = utxo.key();
        assert!(key.ends_with("_1"));

        store.put(utxo.clone()).unwrap();
        assert_eq!(store.get(&key).unwrap(), utxo);

        let mut spent = utxo;
        spent.spent = true;
        store.put(spent).unwrap();
        assert!(store.get(&key).unwrap().spent);
    }
}
