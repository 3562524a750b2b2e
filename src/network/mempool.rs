// Mempool - deduplicating holding area for transactions not yet in a block

use crate::core::{Transaction, hash_transaction};
use std::collections::HashMap;
use std::sync::RwLock;

/// Transactions keyed by their hex hash
#[derive(Default)]
pub struct Mempool {
    txs: RwLock<HashMap<String, Transaction>>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a transaction with the same hash is already pooled
    pub fn has(&self, tx: &Transaction) -> bool {
        let hash = hash_transaction(tx).to_hex();
        self.txs
            .read()
            .expect("mempool lock poisoned")
            .contains_key(&hash)
    }

    /// Insert a transaction; returns true iff it was not pooled before
    pub fn add(&self, tx: Transaction) -> bool {
        let hash = hash_transaction(&tx).to_hex();
        let mut txs = self.txs.write().expect("mempool lock poisoned");
        if txs.contains_key(&hash) {
            return false;
        }
        txs.insert(hash, tx);
        true
    }

    pub fn len(&self) -> usize {
        self.txs.read().expect("mempool lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the whole pool, used by the validator when producing a block
    pub fn take_all(&self) -> Vec<Transaction> {
        let mut txs = self.txs.write().expect("mempool lock poisoned");
        txs.drain().map(|(_, tx)| tx).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Hash256, TxInput, TxOutput};

    fn dummy_tx(marker: u8) -> Transaction {
        Transaction::new(
            vec![TxInput::new(Hash256::new([marker; 32]), 0, vec![marker; 32])],
            vec![TxOutput::new(marker as u64, vec![marker; 20])],
        )
    }

    #[test]
    fn test_add_deduplicates_by_hash() {
        let pool = Mempool::new();
        let tx = dummy_tx(1);

        assert!(!pool.has(&tx));
        assert!(pool.add(tx.clone()));
        assert!(pool.has(&tx));
        assert!(!pool.add(tx.clone()));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_take_all_clears_the_pool() {
        let pool = Mempool::new();
        pool.add(dummy_tx(1));
        pool.add(dummy_tx(2));

        let drained = pool.take_all();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_empty());
    }
}
