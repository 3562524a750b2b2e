// Chain: the sole authority over committed ledger state

use crate::chain::{BlockStore, ChainError, MemoryUtxoStore, TxStore, Utxo, UtxoStore};
use crate::core::{
    Block, Hash256, Header, Transaction, TxOutput, hash_block, hash_header, hash_transaction,
    sign_block, verify_block, verify_transaction,
};
use crate::crypto::PrivateKey;
use std::sync::{Mutex, RwLock};

/// Seed of the well-known genesis key pair. Every node derives the same key,
/// signs the same genesis block and therefore agrees on the genesis hash.
pub const GENESIS_SEED: &str = "1c0fbc3e5edd3857c5882c88a84c52de0e10c442f6ed818b61a8f0a5971b8653";

/// Initial amount credited to the founder address
pub const GENESIS_AMOUNT: u64 = 1000;

/// Append-only list of committed headers, index 0 = genesis
#[derive(Default)]
pub struct HeaderList {
    headers: Vec<Header>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, header: Header) {
        self.headers.push(header);
    }

    /// Panics when the index exceeds the current height. The chain checks
    /// heights before calling this, so an out-of-range index is a bug.
    pub fn get(&self, index: usize) -> &Header {
        if index > self.height() {
            panic!("header index {} beyond height {}", index, self.height());
        }
        &self.headers[index]
    }

    pub fn height(&self) -> usize {
        self.len() - 1
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// The chain owns the header history and all three stores; committing a block
/// through `add_block` is the only way height advances.
pub struct Chain {
    headers: RwLock<HeaderList>,
    block_store: Box<dyn BlockStore>,
    tx_store: Box<dyn TxStore>,
    utxo_store: Box<dyn UtxoStore>,
    /// Serializes validate+commit so two copies of the same block cannot
    /// both validate against the same tip
    commit_lock: Mutex<()>,
}

impl Chain {
    /// Build a chain and commit the genesis block. Genesis is never validated
    /// against a predecessor.
    pub fn new(block_store: Box<dyn BlockStore>, tx_store: Box<dyn TxStore>) -> Self {
        let chain = Self {
            headers: RwLock::new(HeaderList::new()),
            block_store,
            tx_store,
            utxo_store: Box::new(MemoryUtxoStore::new()),
            commit_lock: Mutex::new(()),
        };
        chain
            .commit_block(genesis_block())
            .expect("genesis block must commit");
        chain
    }

    pub fn height(&self) -> usize {
        self.headers.read().expect("header lock poisoned").height()
    }

    /// Validate and commit a block. Concurrent calls are serialized; at most
    /// one of several copies of the same block can pass the tip check.
    pub fn add_block(&self, block: Block) -> Result<(), ChainError> {
        let _guard = self.commit_lock.lock().expect("commit lock poisoned");
        self.validate_block(&block)?;
        self.commit_block(block)
    }

    /// Commit without validation: append the header, store the transactions,
    /// mark consumed UTXOs spent and register the new outputs.
    fn commit_block(&self, block: Block) -> Result<(), ChainError> {
        self.headers
            .write()
            .expect("header lock poisoned")
            .add(block.header.clone());

        for tx in &block.transactions {
            let tx_hash = hash_transaction(tx).to_hex();
            log::debug!("committing tx {}", tx_hash);
            self.tx_store.put(tx)?;

            for input in &tx.inputs {
                let key = Utxo::key_for(&input.prev_tx_hash.to_hex(), input.prev_out_index);
                let mut utxo = self.utxo_store.get(&key)?;
                utxo.spent = true;
                self.utxo_store.put(utxo)?;
            }

            for (index, output) in tx.outputs.iter().enumerate() {
                self.utxo_store.put(Utxo {
                    tx_hash: tx_hash.clone(),
                    out_index: index as u32,
                    amount: output.amount,
                    spent: false,
                })?;
            }
        }

        self.block_store.put(&block)
    }

    /// Check a block's signature, linkage to the current tip, and every
    /// contained transaction. Leaves the chain unmodified.
    pub fn validate_block(&self, block: &Block) -> Result<(), ChainError> {
        if !verify_block(block) {
            return Err(ChainError::InvalidBlockSignature);
        }

        let tip = self.get_block_by_height(self.height())?;
        if hash_block(&tip) != block.header.prev_hash {
            return Err(ChainError::InvalidPrevHash);
        }

        for tx in &block.transactions {
            self.validate_transaction(tx)?;
        }

        Ok(())
    }

    /// Check a transaction's signatures and that it spends only known,
    /// unspent outputs of sufficient total value.
    pub fn validate_transaction(&self, tx: &Transaction) -> Result<(), ChainError> {
        if !verify_transaction(tx) {
            return Err(ChainError::InvalidTxSignature);
        }

        let mut sum_inputs: u64 = 0;
        for input in &tx.inputs {
            let key = Utxo::key_for(&input.prev_tx_hash.to_hex(), input.prev_out_index);
            let utxo = self.utxo_store.get(&key)?;

            if utxo.spent {
                return Err(ChainError::UtxoSpent(key));
            }
            sum_inputs = sum_inputs
                .checked_add(utxo.amount)
                .ok_or(ChainError::ValueOverflow)?;
        }

        let sum_outputs = tx.total_output_value().ok_or(ChainError::ValueOverflow)?;
        // sum_inputs > sum_outputs burns the remainder; only a deficit fails
        if sum_inputs < sum_outputs {
            return Err(ChainError::InsufficientBalance {
                inputs: sum_inputs,
                outputs: sum_outputs,
            });
        }

        Ok(())
    }

    pub fn get_block_by_height(&self, height: usize) -> Result<Block, ChainError> {
        let current = self.height();
        if height > current {
            return Err(ChainError::HeightTooHigh {
                requested: height,
                current,
            });
        }

        let header = self
            .headers
            .read()
            .expect("header lock poisoned")
            .get(height)
            .clone();
        self.get_block_by_hash(&hash_header(&header))
    }

    pub fn get_block_by_hash(&self, hash: &Hash256) -> Result<Block, ChainError> {
        self.block_store.get(&hash.to_hex())
    }
}

/// The deterministic genesis block: one zero-input transaction crediting the
/// founder address, signed with the well-known genesis key.
pub fn genesis_block() -> Block {
    let priv_key = PrivateKey::from_seed_hex(GENESIS_SEED).expect("genesis seed is valid");

    let tx = Transaction::new(
        vec![],
        vec![TxOutput::new(
            GENESIS_AMOUNT,
            priv_key.public().address().as_bytes().to_vec(),
        )],
    );

    let header = Header::new(1, Hash256::zero(), Hash256::zero(), 0, 0);
    let mut block = Block::new(header, vec![tx]);
    sign_block(&priv_key, &mut block);

    block
}
