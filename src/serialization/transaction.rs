//! Transaction wire format serialization/deserialization
//!
//! Legacy transactions use the Bitcoin format, with the segregated-witness
//! marker when any input carries a witness. Typed transactions use the
//! compact privacy format:
//!
//! - Version (1 byte, >= 0xa0) and transaction type (1 byte)
//! - Lock time (4 bytes, little-endian)
//! - Inputs: count (CompactSize), then prevout hash (32), index (4),
//!   scriptSig (CompactSize + bytes), sequence (4)
//! - Outputs: count (CompactSize), then per output a kind tag (1 byte) and
//!   the kind's fields
//! - Witness stacks, one per input (full serialization only)

use super::varint::{decode_varint, encode_varint};
use crate::constants::{COMMITMENT_SIZE, PUBKEY_SIZE};
use crate::error::{ConsensusError, Result, TxRejection};
use crate::types::*;
use sha2::{Digest, Sha256};

/// Error type for transaction parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionParseError {
    InsufficientBytes,
    InvalidInputCount,
    InvalidOutputCount,
    InvalidWitnessMarker,
    TrailingBytes,
}

impl std::fmt::Display for TransactionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionParseError::InsufficientBytes => {
                write!(f, "Insufficient bytes to parse transaction")
            }
            TransactionParseError::InvalidInputCount => write!(f, "Invalid input count"),
            TransactionParseError::InvalidOutputCount => write!(f, "Invalid output count"),
            TransactionParseError::InvalidWitnessMarker => write!(f, "Invalid witness marker"),
            TransactionParseError::TrailingBytes => write!(f, "Trailing bytes after transaction"),
        }
    }
}

impl std::error::Error for TransactionParseError {}

impl From<TransactionParseError> for ConsensusError {
    fn from(err: TransactionParseError) -> Self {
        ConsensusError::Serialization(err.to_string().into())
    }
}

/// Upper bound on decoded element counts
const MAX_DECODED_ITEMS: u64 = 1_000_000;

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&encode_varint(bytes.len() as u64));
    out.extend_from_slice(bytes);
}

fn write_inputs(out: &mut Vec<u8>, inputs: &[TransactionInput]) {
    out.extend_from_slice(&encode_varint(inputs.len() as u64));
    for input in inputs {
        out.extend_from_slice(&input.prevout.hash);
        out.extend_from_slice(&input.prevout.index.to_le_bytes());
        write_bytes(out, &input.script_sig);
        out.extend_from_slice(&input.sequence.to_le_bytes());
    }
}

fn write_witnesses(out: &mut Vec<u8>, inputs: &[TransactionInput]) {
    for input in inputs {
        out.extend_from_slice(&encode_varint(input.witness.len() as u64));
        for item in &input.witness {
            write_bytes(out, item);
        }
    }
}

fn write_typed_output(out: &mut Vec<u8>, output: &TypedOutput) {
    out.push(output.output_type().tag());
    match output {
        TypedOutput::Standard { value, script_pubkey } => {
            out.extend_from_slice(&value.to_le_bytes());
            write_bytes(out, script_pubkey);
        }
        TypedOutput::Confidential {
            commitment,
            data,
            script_pubkey,
            range_proof,
        } => {
            out.extend_from_slice(commitment.as_bytes());
            write_bytes(out, data);
            write_bytes(out, script_pubkey);
            write_bytes(out, range_proof);
        }
        TypedOutput::Anonymized {
            pubkey,
            commitment,
            data,
            range_proof,
            ..
        } => {
            out.extend_from_slice(pubkey);
            out.extend_from_slice(commitment.as_bytes());
            write_bytes(out, data);
            write_bytes(out, range_proof);
        }
        TypedOutput::Data { data } => write_bytes(out, data),
    }
}

fn serialize(tx: &Transaction, with_witness: bool) -> Vec<u8> {
    let mut result = Vec::with_capacity(
        10 + tx.inputs.iter().map(|i| 41 + i.script_sig.len()).sum::<usize>()
            + tx.outputs.iter().map(|o| 9 + o.script_pubkey.len()).sum::<usize>(),
    );

    if tx.is_typed() {
        result.push((tx.version & 0xff) as u8);
        result.push(((tx.version >> 8) & 0xff) as u8);
        result.extend_from_slice(&tx.lock_time.to_le_bytes());
        write_inputs(&mut result, &tx.inputs);
        result.extend_from_slice(&encode_varint(tx.typed_outputs.len() as u64));
        for output in &tx.typed_outputs {
            write_typed_output(&mut result, output);
        }
        if with_witness {
            write_witnesses(&mut result, &tx.inputs);
        }
        return result;
    }

    let segwit = with_witness && tx.inputs.iter().any(|i| !i.witness.is_empty());

    result.extend_from_slice(&tx.version.to_le_bytes());
    if segwit {
        result.extend_from_slice(&[0x00, 0x01]);
    }
    write_inputs(&mut result, &tx.inputs);
    result.extend_from_slice(&encode_varint(tx.outputs.len() as u64));
    for output in &tx.outputs {
        result.extend_from_slice(&output.value.to_le_bytes());
        write_bytes(&mut result, &output.script_pubkey);
    }
    if segwit {
        write_witnesses(&mut result, &tx.inputs);
    }
    result.extend_from_slice(&tx.lock_time.to_le_bytes());

    result
}

/// Serialize a transaction without witness data
pub fn serialize_transaction(tx: &Transaction) -> Vec<u8> {
    serialize(tx, false)
}

/// Serialize a transaction including witness data
pub fn serialize_transaction_with_witness(tx: &Transaction) -> Vec<u8> {
    serialize(tx, true)
}

/// Transaction id: double SHA-256 of the witness-stripped serialization
pub fn calculate_txid(tx: &Transaction) -> Hash {
    let first = Sha256::digest(serialize_transaction(tx));
    let second = Sha256::digest(first);
    let mut txid = [0u8; 32];
    txid.copy_from_slice(&second);
    txid
}

/// Byte cursor over a serialized transaction
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or(TransactionParseError::InsufficientBytes)?;
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(TransactionParseError::InsufficientBytes)?;
        self.offset = end;
        Ok(bytes)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(buf))
    }

    fn varint(&mut self) -> Result<u64> {
        let (value, len) = decode_varint(&self.data[self.offset..])?;
        self.offset += len;
        Ok(value)
    }

    fn count(&mut self, too_many: TransactionParseError) -> Result<usize> {
        let n = self.varint()?;
        if n > MAX_DECODED_ITEMS {
            return Err(too_many.into());
        }
        Ok(n as usize)
    }

    fn bytes(&mut self) -> Result<ByteString> {
        let len = self.varint()?;
        let len = usize::try_from(len).map_err(|_| TransactionParseError::InsufficientBytes)?;
        Ok(self.take(len)?.to_vec())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.take(N)?);
        Ok(bytes)
    }

    fn commitment(&mut self) -> Result<Commitment> {
        self.array::<COMMITMENT_SIZE>().map(Commitment)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn inputs(&mut self) -> Result<Vec<TransactionInput>> {
        let count = self.count(TransactionParseError::InvalidInputCount)?;
        let mut inputs = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(self.take(32)?);
            let index = self.u32()?;
            let script_sig = self.bytes()?;
            let sequence = self.u32()?;
            inputs.push(TransactionInput {
                prevout: OutPoint { hash, index },
                sequence,
                script_sig,
                witness: Vec::new(),
            });
        }
        Ok(inputs)
    }

    fn witnesses(&mut self, inputs: &mut [TransactionInput]) -> Result<()> {
        for input in inputs {
            let items = self.count(TransactionParseError::InvalidInputCount)?;
            input.witness = (0..items).map(|_| self.bytes()).collect::<Result<_>>()?;
        }
        Ok(())
    }

    fn typed_output(&mut self) -> Result<TypedOutput> {
        let tag = self.byte()?;
        let output = match OutputType::from_tag(tag) {
            Some(OutputType::Standard) => TypedOutput::Standard {
                value: self.i64()?,
                script_pubkey: self.bytes()?,
            },
            Some(OutputType::Confidential) => TypedOutput::Confidential {
                commitment: self.commitment()?,
                data: self.bytes()?,
                script_pubkey: self.bytes()?,
                range_proof: self.bytes()?,
            },
            Some(OutputType::Anonymized) => TypedOutput::Anonymized {
                pubkey: self.array::<PUBKEY_SIZE>()?,
                commitment: self.commitment()?,
                data: self.bytes()?,
                range_proof: self.bytes()?,
                anon_index: None,
            },
            Some(OutputType::Data) => TypedOutput::Data { data: self.bytes()? },
            None => {
                return Err(TxRejection::consensus("bad-txns-unknown-output-version")
                    .with_detail(format!("output tag {tag}"))
                    .into())
            }
        };
        Ok(output)
    }
}

/// Deserialize a transaction, with or without witness data
///
/// # Errors
/// `ConsensusError::Serialization` for truncated or malformed data, and
/// `ConsensusError::Rejected` with `bad-txns-unknown-output-version` for an
/// unrecognised typed-output tag.
pub fn deserialize_transaction(data: &[u8]) -> Result<Transaction> {
    let mut reader = Reader { data, offset: 0 };

    let first = *data.first().ok_or(TransactionParseError::InsufficientBytes)?;
    let tx = if first as u32 >= crate::constants::TYPED_TXN_VERSION {
        let version = reader.byte()? as u32 | (reader.byte()? as u32) << 8;
        let lock_time = reader.u32()?;
        let mut inputs = reader.inputs()?;
        let count = reader.count(TransactionParseError::InvalidOutputCount)?;
        let typed_outputs = (0..count)
            .map(|_| reader.typed_output())
            .collect::<Result<Vec<_>>>()?;
        if reader.remaining() > 0 {
            reader.witnesses(&mut inputs)?;
        }
        Transaction {
            version,
            inputs,
            outputs: Vec::new(),
            typed_outputs,
            lock_time,
        }
    } else {
        let version = reader.u32()?;
        let segwit = data.get(reader.offset) == Some(&0x00);
        if segwit && reader.take(2)?[1] != 0x01 {
            return Err(TransactionParseError::InvalidWitnessMarker.into());
        }
        let mut inputs = reader.inputs()?;
        let count = reader.count(TransactionParseError::InvalidOutputCount)?;
        let mut outputs = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            outputs.push(TransactionOutput {
                value: reader.i64()?,
                script_pubkey: reader.bytes()?,
            });
        }
        if segwit {
            reader.witnesses(&mut inputs)?;
        }
        let lock_time = reader.u32()?;
        Transaction {
            version,
            inputs,
            outputs,
            typed_outputs: Vec::new(),
            lock_time,
        }
    };

    if reader.remaining() > 0 {
        return Err(TransactionParseError::TrailingBytes.into());
    }
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn legacy_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint::new([1; 32], 0),
                sequence: SEQUENCE_FINAL,
                script_sig: vec![0x51],
                witness: vec![],
            }],
            outputs: vec![TransactionOutput {
                value: 1000,
                script_pubkey: vec![0x51],
            }],
            typed_outputs: vec![],
            lock_time: 0,
        }
    }

    fn typed_tx() -> Transaction {
        Transaction {
            version: TYPED_TXN_VERSION,
            inputs: vec![TransactionInput {
                prevout: OutPoint::new([2; 32], 3),
                sequence: 7,
                script_sig: vec![],
                witness: vec![vec![0xaa; 64], vec![0x02; 33]],
            }],
            outputs: vec![],
            typed_outputs: vec![
                TypedOutput::Data { data: vec![DO_FEE, 0x64] },
                TypedOutput::Standard { value: 5, script_pubkey: vec![0x51] },
                TypedOutput::Confidential {
                    commitment: Commitment([8; 33]),
                    data: vec![1; 33],
                    script_pubkey: vec![0x52],
                    range_proof: vec![3; 10],
                },
                TypedOutput::Anonymized {
                    pubkey: [4; 33],
                    commitment: Commitment([9; 33]),
                    data: vec![5; 33],
                    range_proof: vec![6; 10],
                    anon_index: None,
                },
            ],
            lock_time: 99,
        }
    }

    #[test]
    fn test_legacy_layout() {
        let bytes = serialize_transaction(&legacy_tx());
        // version(4) + count(1) + input(32+4+1+1+4) + count(1) + output(8+1+1) + lock(4)
        assert_eq!(bytes.len(), 62);
        assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
        assert_eq!(deserialize_transaction(&bytes).unwrap(), legacy_tx());
    }

    #[test]
    fn test_legacy_segwit_marker() {
        let mut tx = legacy_tx();
        tx.inputs[0].witness = vec![vec![0x01, 0x02]];
        let stripped = serialize_transaction(&tx);
        let full = serialize_transaction_with_witness(&tx);
        assert_eq!(&full[4..6], &[0x00, 0x01]);
        assert_eq!(full.len(), stripped.len() + 2 + 1 + 1 + 2);
        assert_eq!(deserialize_transaction(&full).unwrap(), tx);
    }

    #[test]
    fn test_typed_layout() {
        let tx = typed_tx();
        let stripped = serialize_transaction(&tx);
        assert_eq!(stripped[0], 0xa0);
        assert_eq!(stripped[1], 0x00);
        assert_eq!(&stripped[2..6], &99u32.to_le_bytes());

        let full = serialize_transaction_with_witness(&tx);
        assert_eq!(deserialize_transaction(&full).unwrap(), tx);

        let mut without_witness = tx.clone();
        without_witness.inputs[0].witness.clear();
        assert_eq!(deserialize_transaction(&stripped).unwrap(), without_witness);
    }

    #[test]
    fn test_anonymized_pubkey_is_fixed_width() {
        let mut tx = typed_tx();
        tx.typed_outputs.truncate(3);
        let without_anon = serialize_transaction(&tx).len();

        let full = typed_tx();
        let bytes = serialize_transaction(&full);
        // tag(1) + pubkey(33) + commitment(33) + data(1+33) + proof(1+10)
        assert_eq!(bytes.len() - without_anon, 1 + 33 + 33 + 34 + 11);

        let anon_at = without_anon;
        assert_eq!(bytes[anon_at], OutputType::Anonymized.tag());
        assert_eq!(&bytes[anon_at + 1..anon_at + 34], &[4; 33]);
        assert_eq!(&bytes[anon_at + 34..anon_at + 67], &[9; 33]);
    }

    #[test]
    fn test_unknown_output_tag_rejected() {
        let mut tx = typed_tx();
        tx.typed_outputs.truncate(1);
        let mut bytes = serialize_transaction(&tx);
        // Tag of the only output sits after version(2) + lock(4) + inputs(1+32+4+1+4) + count(1)
        let tag_at = 2 + 4 + 42 + 1;
        assert_eq!(bytes[tag_at], OutputType::Data.tag());
        bytes[tag_at] = 5;

        let err = deserialize_transaction(&bytes).unwrap_err();
        assert!(matches!(err, ConsensusError::Rejected(r) if r.code == "bad-txns-unknown-output-version"));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let bytes = serialize_transaction(&legacy_tx());
        assert!(matches!(
            deserialize_transaction(&bytes[..bytes.len() - 1]),
            Err(ConsensusError::Serialization(_))
        ));

        let mut extra = bytes;
        extra.push(0);
        assert!(matches!(
            deserialize_transaction(&extra),
            Err(ConsensusError::Serialization(_))
        ));
        assert!(deserialize_transaction(&[]).is_err());
    }

    #[test]
    fn test_txid_ignores_witness() {
        let mut tx = typed_tx();
        let txid = calculate_txid(&tx);
        tx.inputs[0].witness.clear();
        assert_eq!(calculate_txid(&tx), txid);
        tx.lock_time += 1;
        assert_ne!(calculate_txid(&tx), txid);
    }
}
