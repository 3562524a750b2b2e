// Wire protocol messages
//
// Framing: 12-byte zero-padded ASCII message type, u32 LE payload length,
// payload in the canonical binary encoding. One request frame yields one
// response frame.

use crate::core::{
    Block, Encodable, Transaction, read_var_string, read_varint, write_var_string, write_varint,
};
use std::io::{self, Read, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Node identity exchanged during handshakes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Human-readable software version string
    pub version: String,
    /// Current chain height of the sender
    pub height: u32,
    /// Address the sender accepts connections on
    pub listen_addr: String,
    /// Listen addresses of the sender's known peers
    pub peer_list: Vec<String>,
}

impl Encodable for Version {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_var_string(writer, &self.version)?;
        writer.write_all(&self.height.to_le_bytes())?;
        write_var_string(writer, &self.listen_addr)?;
        write_varint(writer, self.peer_list.len() as u64)?;
        for addr in &self.peer_list {
            write_var_string(writer, addr)?;
        }
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, String> {
        let version = read_var_string(reader)?;

        let mut height_bytes = [0u8; 4];
        reader
            .read_exact(&mut height_bytes)
            .map_err(|e| e.to_string())?;
        let height = u32::from_le_bytes(height_bytes);

        let listen_addr = read_var_string(reader)?;

        let peer_count = read_varint(reader).map_err(|e| e.to_string())? as usize;
        let mut peer_list = Vec::with_capacity(peer_count);
        for _ in 0..peer_count {
            peer_list.push(read_var_string(reader)?);
        }

        Ok(Self {
            version,
            height,
            listen_addr,
            peer_list,
        })
    }
}

/// Protocol message
#[derive(Debug, Clone)]
pub enum Message {
    /// Handshake request carrying the caller's version
    Handshake(Version),
    /// Handshake response carrying the callee's version
    Version(Version),
    /// Transaction submission/gossip
    Tx(Transaction),
    /// Block gossip
    Block(Box<Block>),
    /// Empty acknowledgement
    Ack,
    /// RPC-level failure, carried back to the caller
    Error(String),
}

impl Message {
    pub fn type_str(&self) -> &'static str {
        match self {
            Message::Handshake(_) => "handshake",
            Message::Version(_) => "version",
            Message::Tx(_) => "tx",
            Message::Block(_) => "block",
            Message::Ack => "ack",
            Message::Error(_) => "error",
        }
    }

    /// Serialize into a full frame
    pub fn serialize(&self) -> Vec<u8> {
        let payload = self.serialize_payload();

        let mut bytes = Vec::with_capacity(16 + payload.len());

        let mut type_bytes = [0u8; 12];
        let type_str = self.type_str().as_bytes();
        type_bytes[..type_str.len()].copy_from_slice(type_str);
        bytes.extend_from_slice(&type_bytes);

        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);

        bytes
    }

    fn serialize_payload(&self) -> Vec<u8> {
        match self {
            Message::Handshake(v) | Message::Version(v) => v.encode_to_vec(),
            Message::Tx(tx) => tx.encode_to_vec(),
            Message::Block(block) => block.encode_to_vec(),
            Message::Ack => Vec::new(),
            Message::Error(e) => {
                let mut buf = Vec::new();
                write_var_string(&mut buf, e).expect("writing to a Vec cannot fail");
                buf
            }
        }
    }

    /// Deserialize a full frame
    pub fn deserialize(data: &[u8]) -> Result<Self, String> {
        if data.len() < 16 {
            return Err("message too short".to_string());
        }

        let type_str = std::str::from_utf8(&data[0..12])
            .map_err(|e| format!("invalid message type: {}", e))?
            .trim_end_matches('\0');

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&data[12..16]);
        let payload_len = u32::from_le_bytes(len_bytes) as usize;

        if data.len() < 16 + payload_len {
            return Err("incomplete payload".to_string());
        }
        let payload = &data[16..16 + payload_len];

        match type_str {
            "handshake" => Ok(Message::Handshake(Version::decode_from_slice(payload)?)),
            "version" => Ok(Message::Version(Version::decode_from_slice(payload)?)),
            "tx" => Ok(Message::Tx(Transaction::decode_from_slice(payload)?)),
            "block" => Ok(Message::Block(Box::new(Block::decode_from_slice(payload)?))),
            "ack" => Ok(Message::Ack),
            "error" => {
                let mut cursor = io::Cursor::new(payload);
                Ok(Message::Error(read_var_string(&mut cursor)?))
            }
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

/// Read one framed message from the stream
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Message, String> {
    let mut header = [0u8; 16];
    reader
        .read_exact(&mut header)
        .await
        .map_err(|e| format!("failed to read frame header: {}", e))?;

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&header[12..16]);
    let payload_len = u32::from_le_bytes(len_bytes) as usize;

    let mut frame = header.to_vec();
    if payload_len > 0 {
        let mut payload = vec![0u8; payload_len];
        reader
            .read_exact(&mut payload)
            .await
            .map_err(|e| format!("failed to read frame payload: {}", e))?;
        frame.extend_from_slice(&payload);
    }

    Message::deserialize(&frame)
}

/// Write one framed message to the stream
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg: &Message,
) -> Result<(), String> {
    writer
        .write_all(&msg.serialize())
        .await
        .map_err(|e| format!("failed to write frame: {}", e))?;
    writer
        .flush()
        .await
        .map_err(|e| format!("failed to flush frame: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Hash256, Header, TxInput, TxOutput};

    fn sample_version() -> Version {
        Version {
            version: "picochain-0.1".to_string(),
            height: 7,
            listen_addr: "127.0.0.1:3000".to_string(),
            peer_list: vec!["127.0.0.1:4000".to_string(), "127.0.0.1:5000".to_string()],
        }
    }

    #[test]
    fn test_version_round_trip() {
        let version = sample_version();
        let decoded = Version::decode_from_slice(&version.encode_to_vec()).unwrap();
        assert_eq!(version, decoded);
    }

    #[test]
    fn test_handshake_frame_round_trip() {
        let msg = Message::Handshake(sample_version());
        let decoded = Message::deserialize(&msg.serialize()).unwrap();
        match decoded {
            Message::Handshake(v) => assert_eq!(v, sample_version()),
            other => panic!("wrong message type: {}", other.type_str()),
        }
    }

    #[test]
    fn test_tx_frame_round_trip() {
        let tx = Transaction::new(
            vec![TxInput::new(Hash256::new([1; 32]), 0, vec![1; 32])],
            vec![TxOutput::new(99, vec![2; 20])],
        );
        let msg = Message::Tx(tx.clone());
        match Message::deserialize(&msg.serialize()).unwrap() {
            Message::Tx(decoded) => assert_eq!(decoded, tx),
            other => panic!("wrong message type: {}", other.type_str()),
        }
    }

    #[test]
    fn test_block_frame_round_trip() {
        let block = Block::new(
            Header::new(1, Hash256::new([3; 32]), Hash256::zero(), 2, 42),
            vec![],
        );
        let msg = Message::Block(Box::new(block.clone()));
        match Message::deserialize(&msg.serialize()).unwrap() {
            Message::Block(decoded) => assert_eq!(*decoded, block),
            other => panic!("wrong message type: {}", other.type_str()),
        }
    }

    #[test]
    fn test_ack_and_error_frames() {
        assert!(matches!(
            Message::deserialize(&Message::Ack.serialize()).unwrap(),
            Message::Ack
        ));

        let err = Message::Error("dial failed".to_string());
        match Message::deserialize(&err.serialize()).unwrap() {
            Message::Error(e) => assert_eq!(e, "dial failed"),
            other => panic!("wrong message type: {}", other.type_str()),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut frame = vec![0u8; 16];
        frame[..4].copy_from_slice(b"bogu");
        assert!(Message::deserialize(&frame).is_err());
    }
}
