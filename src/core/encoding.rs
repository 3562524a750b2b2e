// Canonical binary encoding
//
// Every hashable structure has exactly one byte representation: integers are
// little-endian, collections carry a varint count, variable-length byte
// strings carry a varint length prefix.

use std::io::{self, Read, Write};

/// Trait for canonically encodable types
pub trait Encodable: Sized {
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()>;
    fn decode<R: Read>(reader: &mut R) -> Result<Self, String>;

    /// Encode into a fresh buffer
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf).expect("writing to a Vec cannot fail");
        buf
    }

    /// Decode from a byte slice
    fn decode_from_slice(data: &[u8]) -> Result<Self, String> {
        let mut cursor = io::Cursor::new(data);
        Self::decode(&mut cursor)
    }
}

/// Write a variable-length integer
pub fn write_varint<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    match value {
        0..=0xfc => {
            writer.write_all(&[value as u8])?;
        }
        0xfd..=0xffff => {
            writer.write_all(&[0xfd])?;
            writer.write_all(&(value as u16).to_le_bytes())?;
        }
        0x10000..=0xffffffff => {
            writer.write_all(&[0xfe])?;
            writer.write_all(&(value as u32).to_le_bytes())?;
        }
        _ => {
            writer.write_all(&[0xff])?;
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Read a variable-length integer
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> io::Result<u64> {
    let mut first = [0u8; 1];
    reader.read_exact(&mut first)?;

    match first[0] {
        0..=0xfc => Ok(first[0] as u64),
        0xfd => {
            let mut bytes = [0u8; 2];
            reader.read_exact(&mut bytes)?;
            Ok(u16::from_le_bytes(bytes) as u64)
        }
        0xfe => {
            let mut bytes = [0u8; 4];
            reader.read_exact(&mut bytes)?;
            Ok(u32::from_le_bytes(bytes) as u64)
        }
        0xff => {
            let mut bytes = [0u8; 8];
            reader.read_exact(&mut bytes)?;
            Ok(u64::from_le_bytes(bytes))
        }
    }
}

/// Write bytes with a varint length prefix
pub fn write_var_bytes<W: Write>(writer: &mut W, data: &[u8]) -> io::Result<()> {
    write_varint(writer, data.len() as u64)?;
    writer.write_all(data)?;
    Ok(())
}

/// Read bytes with a varint length prefix
pub fn read_var_bytes<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let len = read_varint(reader)? as usize;
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;
    Ok(data)
}

/// Write a UTF-8 string with a varint length prefix
pub fn write_var_string<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    write_var_bytes(writer, s.as_bytes())
}

/// Read a UTF-8 string with a varint length prefix
pub fn read_var_string<R: Read + ?Sized>(reader: &mut R) -> Result<String, String> {
    let bytes = read_var_bytes(reader).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| format!("Invalid UTF-8 string: {}", e))
}
