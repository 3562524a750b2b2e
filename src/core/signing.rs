// Canonical hashing and signature checks for blocks and transactions

use crate::core::{Block, Encodable, Hash256, Header, Transaction, merkle_root, sha256};
use crate::crypto::{PUB_KEY_LEN, PrivateKey, PublicKey, SIGNATURE_LEN, Signature};

/// Hash of a header's canonical encoding
pub fn hash_header(header: &Header) -> Hash256 {
    sha256(&header.encode_to_vec())
}

/// A block's identity is its header hash; the transactions are committed
/// through the header's Merkle root, not hashed directly.
pub fn hash_block(block: &Block) -> Hash256 {
    hash_header(&block.header)
}

/// Hash of a transaction's canonical encoding
pub fn hash_transaction(tx: &Transaction) -> Hash256 {
    sha256(&tx.encode_to_vec())
}

/// Sign a block: commit the transactions into the header's root hash, then
/// sign the block hash and attach the signer's public key and signature.
/// Signing twice with the same key stores the same signature.
pub fn sign_block(priv_key: &PrivateKey, block: &mut Block) -> Signature {
    if !block.transactions.is_empty() {
        block.header.root_hash = merkle_root(&block.transactions);
    }

    let hash = hash_block(block);
    let sig = priv_key.sign(hash.as_bytes());

    block.public_key = priv_key.public().to_bytes().to_vec();
    block.signature = sig.to_bytes().to_vec();

    sig
}

/// Verify a block's root-hash commitment and signature
pub fn verify_block(block: &Block) -> bool {
    if !block.transactions.is_empty() && merkle_root(&block.transactions) != block.header.root_hash
    {
        return false;
    }

    if block.public_key.len() != PUB_KEY_LEN {
        return false;
    }
    if block.signature.len() != SIGNATURE_LEN {
        return false;
    }

    let Ok(pub_key) = PublicKey::from_bytes(&block.public_key) else {
        return false;
    };
    let Ok(sig) = Signature::from_bytes(&block.signature) else {
        return false;
    };

    sig.verify(&pub_key, hash_block(block).as_bytes())
}

/// Sign a transaction. The caller attaches the signature to the relevant
/// input(s); at signing time all input signature fields are empty, so the
/// signed digest commits to everything except the signatures themselves.
pub fn sign_transaction(priv_key: &PrivateKey, tx: &Transaction) -> Signature {
    priv_key.sign(hash_transaction(tx).as_bytes())
}

/// Verify every input signature of a transaction against the hash of the
/// transaction with all input signatures cleared. The passed transaction is
/// left untouched.
pub fn verify_transaction(tx: &Transaction) -> bool {
    let mut unsigned = tx.clone();
    for input in &mut unsigned.inputs {
        input.signature.clear();
    }
    let hash = hash_transaction(&unsigned);

    for input in &tx.inputs {
        let Ok(pub_key) = PublicKey::from_bytes(&input.public_key) else {
            return false;
        };
        let Ok(sig) = Signature::from_bytes(&input.signature) else {
            return false;
        };
        if !sig.verify(&pub_key, hash.as_bytes()) {
            return false;
        }
    }

    true
}
