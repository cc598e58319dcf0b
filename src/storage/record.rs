//! Named object record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, includes itself and checksum)
//! +------------------+
//! | Object Name      | (u32 LE length-prefixed UTF-8)
//! +------------------+
//! | Object Payload   | (u32 LE length-prefixed bytes)
//! +------------------+
//! | Checksum         | (u32 LE CRC32)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use super::checksum::compute_checksum;

/// Smallest possible record: length + empty name + empty payload + checksum
pub const MIN_RECORD_SIZE: usize = 4 + 4 + 4 + 4;

/// One named object as stored in the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Object name, the lookup key
    pub name: String,
    /// Serialized object
    pub payload: Vec<u8>,
}

impl ObjectRecord {
    /// Creates a record
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Encodes the record, checksum last
    pub fn serialize(&self) -> Vec<u8> {
        let record_length = MIN_RECORD_SIZE + self.name.len() + self.payload.len();

        let mut buf = Vec::with_capacity(record_length);
        buf.extend_from_slice(&(record_length as u32).to_le_bytes());
        buf.extend_from_slice(&(self.name.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.name.as_bytes());
        buf.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.payload);

        let checksum = compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Decodes one record from the front of `data`, verifying its checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> Result<(Self, usize), String> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(format!("record truncated: {} bytes", data.len()));
        }

        let record_length = read_u32(data, 0) as usize;
        if record_length < MIN_RECORD_SIZE {
            return Err(format!("invalid record length: {}", record_length));
        }
        if record_length > data.len() {
            return Err(format!(
                "record length {} exceeds remaining {} bytes",
                record_length,
                data.len()
            ));
        }

        let body_end = record_length - 4;
        let stored = read_u32(data, body_end);
        let computed = compute_checksum(&data[..body_end]);
        if stored != computed {
            return Err(format!(
                "checksum mismatch: stored {:08x}, computed {:08x}",
                stored, computed
            ));
        }

        let mut cursor = 4;
        let name_bytes = read_prefixed(data, &mut cursor, body_end)?;
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|e| format!("object name is not UTF-8: {}", e))?;
        let payload = read_prefixed(data, &mut cursor, body_end)?.to_vec();

        if cursor != body_end {
            return Err(format!(
                "record body has {} trailing bytes",
                body_end - cursor
            ));
        }

        Ok((Self { name, payload }, record_length))
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn read_prefixed<'a>(data: &'a [u8], cursor: &mut usize, end: usize) -> Result<&'a [u8], String> {
    if *cursor + 4 > end {
        return Err("length prefix past end of record".to_string());
    }
    let len = read_u32(data, *cursor) as usize;
    *cursor += 4;
    if *cursor + len > end {
        return Err(format!("field of {} bytes past end of record", len));
    }
    let field = &data[*cursor..*cursor + len];
    *cursor += len;
    Ok(field)
}
