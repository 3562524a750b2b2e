// Transaction data structures

use crate::core::{Encodable, Hash256, read_var_bytes, read_varint, write_var_bytes, write_varint};
use std::io::{self, Read, Write};

/// Transaction input - references a previous transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Hash of the transaction whose output is being spent
    pub prev_tx_hash: Hash256,
    /// Index of the output in that transaction
    pub prev_out_index: u32,
    /// Public key of the spender (32 bytes)
    pub public_key: Vec<u8>,
    /// Signature over the transaction hash (64 bytes, empty until signed)
    pub signature: Vec<u8>,
}

impl TxInput {
    pub fn new(prev_tx_hash: Hash256, prev_out_index: u32, public_key: Vec<u8>) -> Self {
        Self {
            prev_tx_hash,
            prev_out_index,
            public_key,
            signature: Vec::new(),
        }
    }
}

impl Encodable for TxInput {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.prev_tx_hash.as_bytes())?;
        writer.write_all(&self.prev_out_index.to_le_bytes())?;
        write_var_bytes(writer, &self.public_key)?;
        write_var_bytes(writer, &self.signature)?;
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, String> {
        let mut hash_bytes = [0u8; 32];
        reader
            .read_exact(&mut hash_bytes)
            .map_err(|e| e.to_string())?;
        let prev_tx_hash = Hash256::new(hash_bytes);

        let mut index_bytes = [0u8; 4];
        reader
            .read_exact(&mut index_bytes)
            .map_err(|e| e.to_string())?;
        let prev_out_index = u32::from_le_bytes(index_bytes);

        let public_key = read_var_bytes(reader).map_err(|e| e.to_string())?;
        let signature = read_var_bytes(reader).map_err(|e| e.to_string())?;

        Ok(Self {
            prev_tx_hash,
            prev_out_index,
            public_key,
            signature,
        })
    }
}

/// Transaction output - credits an amount to an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount of value transferred
    pub amount: u64,
    /// Recipient address (20 bytes)
    pub address: Vec<u8>,
}

impl TxOutput {
    pub fn new(amount: u64, address: Vec<u8>) -> Self {
        Self { amount, address }
    }
}

impl Encodable for TxOutput {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.amount.to_le_bytes())?;
        write_var_bytes(writer, &self.address)?;
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, String> {
        let mut amount_bytes = [0u8; 8];
        reader
            .read_exact(&mut amount_bytes)
            .map_err(|e| e.to_string())?;
        let amount = u64::from_le_bytes(amount_bytes);

        let address = read_var_bytes(reader).map_err(|e| e.to_string())?;

        Ok(Self { amount, address })
    }
}

/// Transaction - moves value from spent outputs to new outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
        }
    }

    /// Total value across all outputs; None if the sum overflows u64
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |sum, out| sum.checked_add(out.amount))
    }
}

impl Encodable for Transaction {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.version.to_le_bytes())?;

        write_varint(writer, self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.encode(writer)?;
        }

        write_varint(writer, self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.encode(writer)?;
        }

        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, String> {
        let mut version_bytes = [0u8; 4];
        reader
            .read_exact(&mut version_bytes)
            .map_err(|e| e.to_string())?;
        let version = u32::from_le_bytes(version_bytes);

        let input_count = read_varint(reader).map_err(|e| e.to_string())? as usize;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxInput::decode(reader)?);
        }

        let output_count = read_varint(reader).map_err(|e| e.to_string())? as usize;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOutput::decode(reader)?);
        }

        Ok(Self {
            version,
            inputs,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    fn sample_transaction() -> Transaction {
        let priv_key = PrivateKey::generate();
        let input = TxInput::new(Hash256::new([1; 32]), 0, priv_key.public().to_bytes().to_vec());
        let output = TxOutput::new(
            99,
            priv_key.public().address().as_bytes().to_vec(),
        );
        Transaction::new(vec![input], vec![output])
    }

    #[test]
    fn test_transaction_round_trip() {
        let tx = sample_transaction();
        let encoded = tx.encode_to_vec();
        let decoded = Transaction::decode_from_slice(&encoded).unwrap();
        assert_eq!(tx, decoded);
    }

    #[test]
    fn test_transaction_with_signature_round_trip() {
        let mut tx = sample_transaction();
        tx.inputs[0].signature = vec![7u8; 64];

        let encoded = tx.encode_to_vec();
        let decoded = Transaction::decode_from_slice(&encoded).unwrap();
        assert_eq!(tx, decoded);
    }

    #[test]
    fn test_total_output_value() {
        let mut tx = sample_transaction();
        tx.outputs.push(TxOutput::new(1, vec![0u8; 20]));
        assert_eq!(tx.total_output_value(), Some(100));
    }

    #[test]
    fn test_total_output_value_overflow_is_none() {
        let mut tx = sample_transaction();
        tx.outputs.push(TxOutput::new(u64::MAX, vec![0u8; 20]));
        assert_eq!(tx.total_output_value(), None);
    }
}
