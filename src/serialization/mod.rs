//! Wire format serialization/deserialization
//!
//! Consensus-critical encodings: transaction ids and virtual sizes are
//! computed over these bytes, so they must be reproduced exactly.
//!
//! All fixed-width integers are little-endian.

pub mod transaction;
pub mod varint;

pub use transaction::{
    calculate_txid, deserialize_transaction, serialize_transaction,
    serialize_transaction_with_witness, TransactionParseError,
};
pub use varint::{decode_data_varint, decode_varint, encode_data_varint, encode_varint, VarIntError};
