//! Variable-length integer encodings
//!
//! Two encodings appear on the wire:
//!
//! - **CompactSize** (`encode_varint`): length prefixes of vectors and scripts.
//!   1, 3, 5 or 9 bytes with `0xfd`/`0xfe`/`0xff` prefixes, little-endian.
//! - **Data varint** (`encode_data_varint`): integers embedded in data-output
//!   payloads, such as the explicit fee. 7-bit little-endian groups with the
//!   high bit marking continuation.

use crate::error::{ConsensusError, Result};
use std::borrow::Cow;

/// Error type for VarInt encoding/decoding failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarIntError {
    /// Insufficient bytes to decode VarInt
    InsufficientBytes,
    /// Invalid VarInt encoding format
    InvalidEncoding,
    /// VarInt value exceeds maximum (u64::MAX)
    ValueTooLarge,
}

impl std::fmt::Display for VarIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarIntError::InsufficientBytes => write!(f, "Insufficient bytes to decode VarInt"),
            VarIntError::InvalidEncoding => write!(f, "Invalid VarInt encoding"),
            VarIntError::ValueTooLarge => write!(f, "VarInt value too large"),
        }
    }
}

impl std::error::Error for VarIntError {}

impl From<VarIntError> for ConsensusError {
    fn from(err: VarIntError) -> Self {
        ConsensusError::Serialization(Cow::Owned(err.to_string()))
    }
}

/// Encode a u64 value as a CompactSize
///
/// # Examples
///
/// ```
/// use blvm_ct_consensus::serialization::varint::encode_varint;
///
/// assert_eq!(encode_varint(252), vec![252]);
/// assert_eq!(encode_varint(253), vec![0xfd, 253, 0]);
/// assert_eq!(encode_varint(65536), vec![0xfe, 0, 0, 1, 0]);
/// ```
pub fn encode_varint(value: u64) -> Vec<u8> {
    if value < 0xfd {
        vec![value as u8]
    } else if value <= 0xffff {
        let mut result = vec![0xfd];
        result.extend_from_slice(&(value as u16).to_le_bytes());
        result
    } else if value <= 0xffffffff {
        let mut result = vec![0xfe];
        result.extend_from_slice(&(value as u32).to_le_bytes());
        result
    } else {
        let mut result = vec![0xff];
        result.extend_from_slice(&value.to_le_bytes());
        result
    }
}

/// Decode a CompactSize from bytes
///
/// Returns the decoded value and the number of bytes consumed.
/// Non-canonical encodings are rejected.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let first_byte = *data.first().ok_or(VarIntError::InsufficientBytes)?;

    match first_byte {
        b if b < 0xfd => Ok((b as u64, 1)),
        0xfd => {
            let bytes = data.get(1..3).ok_or(VarIntError::InsufficientBytes)?;
            let value = u16::from_le_bytes([bytes[0], bytes[1]]) as u64;
            if value < 0xfd {
                return Err(VarIntError::InvalidEncoding.into());
            }
            Ok((value, 3))
        }
        0xfe => {
            let bytes = data.get(1..5).ok_or(VarIntError::InsufficientBytes)?;
            let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64;
            if value <= 0xffff {
                return Err(VarIntError::InvalidEncoding.into());
            }
            Ok((value, 5))
        }
        _ => {
            let bytes = data.get(1..9).ok_or(VarIntError::InsufficientBytes)?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            let value = u64::from_le_bytes(buf);
            if value <= 0xffffffff {
                return Err(VarIntError::InvalidEncoding.into());
            }
            Ok((value, 9))
        }
    }
}

/// Encode a data-output integer: 7-bit groups, least significant first
pub fn encode_data_varint(mut value: u64) -> Vec<u8> {
    let mut result = Vec::with_capacity(10);
    let mut byte = (value & 0x7f) as u8;
    loop {
        value >>= 7;
        if value == 0 {
            break;
        }
        result.push(byte | 0x80);
        byte = (value & 0x7f) as u8;
    }
    result.push(byte);
    result
}

/// Decode a data-output integer
///
/// Returns the decoded value and the number of bytes consumed.
pub fn decode_data_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in data.iter().enumerate() {
        let shift = 7 * i as u32;
        let group = (byte & 0x7f) as u64;
        if shift >= 64 || (shift > 0 && group >> (64 - shift) != 0) {
            return Err(VarIntError::ValueTooLarge.into());
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(VarIntError::InsufficientBytes.into())
}
