// Block data structures

use crate::core::{
    Encodable, Hash256, Transaction, hash_transaction, read_var_bytes, read_varint, sha256,
    write_var_bytes, write_varint,
};
use std::io::{self, Read, Write};

/// Block header - 80 bytes canonical encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Block version
    pub version: u32,
    /// Hash of the previous block's header
    pub prev_hash: Hash256,
    /// Merkle root of the block's transactions (zero if the block is empty)
    pub root_hash: Hash256,
    /// Chain height of this block
    pub height: u32,
    /// Block timestamp (Unix epoch seconds)
    pub timestamp: u64,
}

impl Header {
    pub fn new(
        version: u32,
        prev_hash: Hash256,
        root_hash: Hash256,
        height: u32,
        timestamp: u64,
    ) -> Self {
        Self {
            version,
            prev_hash,
            root_hash,
            height,
            timestamp,
        }
    }
}

impl Encodable for Header {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(self.prev_hash.as_bytes())?;
        writer.write_all(self.root_hash.as_bytes())?;
        writer.write_all(&self.height.to_le_bytes())?;
        writer.write_all(&self.timestamp.to_le_bytes())?;
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, String> {
        let mut version_bytes = [0u8; 4];
        reader
            .read_exact(&mut version_bytes)
            .map_err(|e| e.to_string())?;
        let version = u32::from_le_bytes(version_bytes);

        let mut prev_bytes = [0u8; 32];
        reader
            .read_exact(&mut prev_bytes)
            .map_err(|e| e.to_string())?;
        let prev_hash = Hash256::new(prev_bytes);

        let mut root_bytes = [0u8; 32];
        reader
            .read_exact(&mut root_bytes)
            .map_err(|e| e.to_string())?;
        let root_hash = Hash256::new(root_bytes);

        let mut height_bytes = [0u8; 4];
        reader
            .read_exact(&mut height_bytes)
            .map_err(|e| e.to_string())?;
        let height = u32::from_le_bytes(height_bytes);

        let mut ts_bytes = [0u8; 8];
        reader.read_exact(&mut ts_bytes).map_err(|e| e.to_string())?;
        let timestamp = u64::from_le_bytes(ts_bytes);

        Ok(Self {
            version,
            prev_hash,
            root_hash,
            height,
            timestamp,
        })
    }
}

/// Block - a signed header plus the transactions it commits to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
    /// Public key of the block signer (32 bytes, empty until signed)
    pub public_key: Vec<u8>,
    /// Signature over the block hash (64 bytes, empty until signed)
    pub signature: Vec<u8>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
            public_key: Vec::new(),
            signature: Vec::new(),
        }
    }
}

impl Encodable for Block {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.header.encode(writer)?;

        write_varint(writer, self.transactions.len() as u64)?;
        for tx in &self.transactions {
            tx.encode(writer)?;
        }

        write_var_bytes(writer, &self.public_key)?;
        write_var_bytes(writer, &self.signature)?;
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, String> {
        let header = Header::decode(reader)?;

        let tx_count = read_varint(reader).map_err(|e| e.to_string())? as usize;
        let mut transactions = Vec::with_capacity(tx_count);
        for _ in 0..tx_count {
            transactions.push(Transaction::decode(reader)?);
        }

        let public_key = read_var_bytes(reader).map_err(|e| e.to_string())?;
        let signature = read_var_bytes(reader).map_err(|e| e.to_string())?;

        Ok(Self {
            header,
            transactions,
            public_key,
            signature,
        })
    }
}

/// Merkle root over the canonical hashes of the transactions, in list order.
/// Odd nodes are paired with themselves; an empty list yields the zero hash.
pub fn merkle_root(transactions: &[Transaction]) -> Hash256 {
    if transactions.is_empty() {
        return Hash256::zero();
    }

    let mut hashes: Vec<Hash256> = transactions.iter().map(hash_transaction).collect();

    while hashes.len() > 1 {
        let mut next_level = Vec::with_capacity(hashes.len().div_ceil(2));

        for chunk in hashes.chunks(2) {
            let left = chunk[0];
            let right = if chunk.len() == 2 { chunk[1] } else { chunk[0] };

            let mut combined = Vec::with_capacity(64);
            combined.extend_from_slice(left.as_bytes());
            combined.extend_from_slice(right.as_bytes());
            next_level.push(sha256(&combined));
        }

        hashes = next_level;
    }

    hashes[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TxInput, TxOutput};

    fn dummy_tx(marker: u8) -> Transaction {
        Transaction::new(
            vec![TxInput::new(Hash256::new([marker; 32]), 0, vec![marker; 32])],
            vec![TxOutput::new(marker as u64, vec![marker; 20])],
        )
    }

    #[test]
    fn test_header_encoding_is_80_bytes() {
        let header = Header::new(1, Hash256::zero(), Hash256::zero(), 0, 1234567890);
        let encoded = header.encode_to_vec();
        assert_eq!(encoded.len(), 80);

        let decoded = Header::decode_from_slice(&encoded).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn test_block_round_trip() {
        let header = Header::new(1, Hash256::new([9; 32]), Hash256::zero(), 3, 42);
        let mut block = Block::new(header, vec![dummy_tx(1), dummy_tx(2)]);
        block.public_key = vec![5u8; 32];
        block.signature = vec![6u8; 64];

        let encoded = block.encode_to_vec();
        let decoded = Block::decode_from_slice(&encoded).unwrap();
        assert_eq!(block, decoded);
    }

    #[test]
    fn test_merkle_root_empty() {
        assert_eq!(merkle_root(&[]), Hash256::zero());
    }

    #[test]
    fn test_merkle_root_single_tx() {
        let tx = dummy_tx(1);
        assert_eq!(merkle_root(std::slice::from_ref(&tx)), hash_transaction(&tx));
    }

    #[test]
    fn test_merkle_root_order_sensitive() {
        let txs = [dummy_tx(1), dummy_tx(2), dummy_tx(3)];
        let reordered = [txs[1].clone(), txs[0].clone(), txs[2].clone()];
        assert_ne!(merkle_root(&txs), merkle_root(&reordered));
    }
}
