// Ledger error types

use std::fmt;

/// Errors returned by chain validation and store lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// No block stored under the given hash
    BlockNotFound(String),
    /// No transaction stored under the given hash
    TxNotFound(String),
    /// No UTXO stored under the given key
    UtxoNotFound(String),
    /// Requested height exceeds the current chain height
    HeightTooHigh { requested: usize, current: usize },
    /// Block signature or root-hash commitment does not verify
    InvalidBlockSignature,
    /// Block does not extend the current tip
    InvalidPrevHash,
    /// Transaction input signature does not verify
    InvalidTxSignature,
    /// Transaction spends a UTXO that is already marked spent
    UtxoSpent(String),
    /// Transaction outputs exceed the value of its inputs
    InsufficientBalance { inputs: u64, outputs: u64 },
    /// Summing the transaction's input or output values overflows u64
    ValueOverflow,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::BlockNotFound(hash) => {
                write!(f, "block with hash [{}] does not exist", hash)
            }
            ChainError::TxNotFound(hash) => {
                write!(f, "transaction with hash [{}] does not exist", hash)
            }
            ChainError::UtxoNotFound(key) => write!(f, "utxo [{}] does not exist", key),
            ChainError::HeightTooHigh { requested, current } => write!(
                f,
                "given height [{}] too high - current height [{}]",
                requested, current
            ),
            ChainError::InvalidBlockSignature => write!(f, "invalid block signature"),
            ChainError::InvalidPrevHash => write!(f, "invalid previous block hash"),
            ChainError::InvalidTxSignature => write!(f, "invalid transaction signature"),
            ChainError::UtxoSpent(key) => write!(f, "utxo [{}] is already spent", key),
            ChainError::InsufficientBalance { inputs, outputs } => write!(
                f,
                "insufficient balance: got ({}) spending ({})",
                inputs, outputs
            ),
            ChainError::ValueOverflow => write!(f, "transaction value sum overflows"),
        }
    }
}

impl std::error::Error for ChainError {}
