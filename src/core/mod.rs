// Ledger data structures and canonical hashing

mod block;
mod encoding;
mod hash;
mod signing;
mod transaction;
mod types;

pub use block::{Block, Header, merkle_root};
pub use encoding::{
    Encodable, read_var_bytes, read_var_string, read_varint, write_var_bytes, write_var_string,
    write_varint,
};
pub use hash::sha256;
pub use signing::{
    hash_block, hash_header, hash_transaction, sign_block, sign_transaction, verify_block,
    verify_transaction,
};
pub use transaction::{Transaction, TxInput, TxOutput};
pub use types::Hash256;
