//! Core transaction types for consensus validation

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Integer type (amounts)
pub type Integer = i64;

/// Witness stack of one input
pub type Witness = Vec<ByteString>;

/// OutPoint: reference to output `index` of transaction `hash`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// The prevout used by coinbase inputs
    pub fn null() -> Self {
        Self {
            hash: [0u8; 32],
            index: NULL_INDEX,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.index == NULL_INDEX && self.hash == [0u8; 32]
    }

    /// Anonymous inputs reuse the outpoint to carry ring parameters
    #[inline]
    pub fn is_anon(&self) -> bool {
        self.index == ANON_MARKER
    }
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub sequence: u32,
    pub script_sig: ByteString,
    #[serde(default)]
    pub witness: Witness,
}

impl TransactionInput {
    /// Anonymous inputs spend from the anonymity set and have no explicit prior output
    #[inline]
    pub fn is_anon(&self) -> bool {
        self.prevout.is_anon()
    }
}

/// Legacy plaintext output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Integer,
    pub script_pubkey: ByteString,
}

/// Pedersen commitment to a hidden amount
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "fixed_bytes")] pub [u8; COMMITMENT_SIZE]);

impl Commitment {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({})", hex::encode(self.0))
    }
}

impl From<[u8; COMMITMENT_SIZE]> for Commitment {
    fn from(bytes: [u8; COMMITMENT_SIZE]) -> Self {
        Commitment(bytes)
    }
}

/// Serde for byte arrays longer than serde's built-in 32
mod fixed_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<const N: usize, S: Serializer>(bytes: &[u8; N], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, const N: usize, D: Deserializer<'de>>(d: D) -> Result<[u8; N], D::Error> {
        let v: Vec<u8> = Vec::deserialize(d)?;
        v.as_slice()
            .try_into()
            .map_err(|_| D::Error::invalid_length(v.len(), &"a fixed-size byte array"))
    }
}

/// Output kind tag, shared by typed outputs and recorded coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OutputType {
    Standard = 1,
    Confidential = 2,
    Anonymized = 3,
    Data = 4,
}

impl OutputType {
    /// Wire tag of this kind
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(OutputType::Standard),
            2 => Some(OutputType::Confidential),
            3 => Some(OutputType::Anonymized),
            4 => Some(OutputType::Data),
            _ => None,
        }
    }
}

/// Typed output of a privacy-capable transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypedOutput {
    /// Plaintext value locked by a script
    Standard {
        value: Integer,
        script_pubkey: ByteString,
    },
    /// Blinded value locked by a script
    Confidential {
        commitment: Commitment,
        data: ByteString,
        script_pubkey: ByteString,
        range_proof: ByteString,
    },
    /// Blinded value spendable through the anonymity set
    Anonymized {
        #[serde(with = "fixed_bytes")]
        pubkey: [u8; PUBKEY_SIZE],
        commitment: Commitment,
        data: ByteString,
        range_proof: ByteString,
        /// Position in the anonymity-set registry once the output is connected
        anon_index: Option<u64>,
    },
    /// Protocol metadata, carries no value
    Data { data: ByteString },
}

impl TypedOutput {
    pub fn output_type(&self) -> OutputType {
        match self {
            TypedOutput::Standard { .. } => OutputType::Standard,
            TypedOutput::Confidential { .. } => OutputType::Confidential,
            TypedOutput::Anonymized { .. } => OutputType::Anonymized,
            TypedOutput::Data { .. } => OutputType::Data,
        }
    }

    /// Script locking this output, if the kind has one
    pub fn script_pubkey(&self) -> Option<&ByteString> {
        match self {
            TypedOutput::Standard { script_pubkey, .. }
            | TypedOutput::Confidential { script_pubkey, .. } => Some(script_pubkey),
            TypedOutput::Anonymized { .. } | TypedOutput::Data { .. } => None,
        }
    }

    pub fn commitment(&self) -> Option<&Commitment> {
        match self {
            TypedOutput::Confidential { commitment, .. }
            | TypedOutput::Anonymized { commitment, .. } => Some(commitment),
            TypedOutput::Standard { .. } | TypedOutput::Data { .. } => None,
        }
    }
}

/// Transaction type carried in the second byte of a typed transaction's version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    Standard,
    Coinbase,
    Coinstake,
    Other(u8),
}

impl From<u8> for TxType {
    fn from(byte: u8) -> Self {
        match byte {
            0 => TxType::Standard,
            1 => TxType::Coinbase,
            2 => TxType::Coinstake,
            other => TxType::Other(other),
        }
    }
}

/// Transaction
///
/// Legacy transactions use `outputs`; typed transactions use `typed_outputs`.
/// The two lists are mutually exclusive, which `check_transaction` enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    #[serde(default)]
    pub outputs: Vec<TransactionOutput>,
    #[serde(default)]
    pub typed_outputs: Vec<TypedOutput>,
    pub lock_time: u32,
}

/// Running per-kind counters used while reconciling inputs and outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub standard: usize,
    pub confidential: usize,
    pub anonymized: usize,
}

impl KindCounts {
    /// Number of distinct kinds present
    pub fn kinds_present(&self) -> usize {
        (self.standard > 0) as usize + (self.confidential > 0) as usize + (self.anonymized > 0) as usize
    }
}

impl Transaction {
    /// Typed transactions carry `TYPED_TXN_VERSION` or above in the low version byte
    #[inline]
    pub fn is_typed(&self) -> bool {
        (self.version & 0xff) >= TYPED_TXN_VERSION
    }

    pub fn tx_type(&self) -> TxType {
        if !self.is_typed() {
            return TxType::Standard;
        }
        TxType::from(((self.version >> 8) & 0xff) as u8)
    }

    /// Sum of legacy output values, saturating at the i64 range
    pub fn value_out(&self) -> Integer {
        self.outputs
            .iter()
            .fold(0i64, |acc, o| acc.saturating_add(o.value))
    }

    /// Sum of plaintext typed-output values, counting every value-bearing output by kind
    pub fn plain_value_out(&self, counts: &mut KindCounts) -> Integer {
        let mut total = 0i64;
        for output in &self.typed_outputs {
            match output {
                TypedOutput::Standard { value, .. } => {
                    total = total.saturating_add(*value);
                    counts.standard += 1;
                }
                TypedOutput::Confidential { .. } => counts.confidential += 1,
                TypedOutput::Anonymized { .. } => counts.anonymized += 1,
                TypedOutput::Data { .. } => {}
            }
        }
        total
    }

    /// Explicit fee of a blinded transaction, read from the leading fee data output
    ///
    /// The encoded value is unsigned and reinterpreted as an amount, so values
    /// of 2^63 and above come back negative for the fee checks to reject.
    pub fn ct_fee(&self) -> Option<Integer> {
        let data = match self.typed_outputs.first()? {
            TypedOutput::Data { data } => data,
            _ => return None,
        };
        if data.len() < 2 || data[0] != DO_FEE {
            return None;
        }
        let (fee, _) = crate::serialization::varint::decode_data_varint(&data[1..]).ok()?;
        Some(fee as Integer)
    }

    /// Total secure-message funding declared in data outputs
    pub fn total_smsg_fees(&self) -> Integer {
        let mut total = 0i64;
        for output in &self.typed_outputs {
            let data = match output {
                TypedOutput::Data { data } => data,
                _ => continue,
            };
            if data.len() < SMSG_FUND_ENTRY_SIZE + 1 || data[0] != DO_FUND_MSG {
                continue;
            }
            for entry in data[1..].chunks_exact(SMSG_FUND_ENTRY_SIZE) {
                let fee = u32::from_le_bytes([entry[20], entry[21], entry[22], entry[23]]);
                total = total.saturating_add(fee as i64);
            }
        }
        total
    }
}

/// Previously recorded output spent by an input
///
/// Supplied read-only by the coin view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub output_type: OutputType,
    /// Plaintext value; zero for blinded coins
    pub value: Integer,
    pub commitment: Option<Commitment>,
    pub script_pubkey: ByteString,
    pub height: Natural,
    pub is_coinbase: bool,
    pub is_coinstake: bool,
    #[serde(default)]
    pub spent: bool,
}

impl Coin {
    /// Unspent plaintext coin
    pub fn standard(value: Integer, script_pubkey: ByteString, height: Natural) -> Self {
        Self {
            output_type: OutputType::Standard,
            value,
            commitment: None,
            script_pubkey,
            height,
            is_coinbase: false,
            is_coinstake: false,
            spent: false,
        }
    }

    /// Unspent blinded coin
    pub fn confidential(commitment: Commitment, script_pubkey: ByteString, height: Natural) -> Self {
        Self {
            output_type: OutputType::Confidential,
            value: 0,
            commitment: Some(commitment),
            script_pubkey,
            height,
            is_coinbase: false,
            is_coinstake: false,
            spent: false,
        }
    }

    /// Coinbase and coinstake outputs must mature before being spent
    #[inline]
    pub fn is_block_reward(&self) -> bool {
        self.is_coinbase || self.is_coinstake
    }
}

/// Block header, used for median time-past
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u32,
}
