//! Consensus constants for confidential-output transaction validation

/// Base units per coin
pub const COIN: i64 = 100_000_000;

/// Maximum money supply in base units
pub const MAX_MONEY: i64 = 21_000_000 * COIN;

/// Maximum block weight in weight units
/// Weight = (stripped_size × 4) + witness_size
pub const MAX_BLOCK_WEIGHT: usize = 4_000_000;

/// Witness scale factor, shared by the weight rule and sig-op cost accounting
pub const WITNESS_SCALE_FACTOR: usize = 4;

/// Lock time threshold: lock times below this are block heights, otherwise Unix time
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Sequence number marking an input as final
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// BIP68: when set, the sequence number carries no relative lock-time meaning
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 0x8000_0000;

/// BIP68: when set, the relative lock is time based, otherwise height based
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 0x0040_0000;

/// BIP68: mask extracting the relative lock value
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

/// BIP68: time-based locks are measured in units of 2^9 = 512 seconds
pub const SEQUENCE_LOCKTIME_GRANULARITY: u32 = 9;

/// Lock-time flag requesting BIP68 enforcement in `calculate_sequence_locks`
pub const LOCKTIME_VERIFY_SEQUENCE: u32 = 0x01;

/// Script flag enabling pay-to-script-hash sig-op accounting
pub const SCRIPT_VERIFY_P2SH: u32 = 0x01;

/// Script flag enabling witness rules
pub const SCRIPT_VERIFY_WITNESS: u32 = 0x800;

/// Coinbase/coinstake maturity requirement in blocks
pub const COINBASE_MATURITY: u64 = 100;

/// Outpoint index tagging an anonymous (ring) input
pub const ANON_MARKER: u32 = 0xffff_ffa0;

/// Outpoint index of a null prevout
pub const NULL_INDEX: u32 = 0xffff_ffff;

/// Low byte of `Transaction::version` from which typed outputs are used
pub const TYPED_TXN_VERSION: u32 = 0xa0;

/// Coinbase scriptSig length bounds
pub const MIN_COINBASE_SCRIPT_SIZE: usize = 2;
pub const MAX_COINBASE_SCRIPT_SIZE: usize = 100;

/// Ephemeral data of blinded outputs: 33-byte ephemeral key, optional
/// 5-byte stealth prefix and 33-byte encrypted narration key.
pub const MIN_EPHEMERAL_DATA_SIZE: usize = 33;
pub const MAX_EPHEMERAL_DATA_SIZE: usize = 33 + 5 + 33;

/// Range proof length bounds for blinded outputs
pub const MIN_RANGEPROOF_SIZE: usize = 500;
pub const MAX_RANGEPROOF_SIZE: usize = 5134;

/// Data output payload bounds: stealth 33+1, prefix 4+1, narration 33+1
pub const MIN_DATA_OUTPUT_SIZE: usize = 1;
pub const MAX_DATA_OUTPUT_SIZE: usize = 34 + 5 + 34;

/// Data output payload tag carrying the explicit fee of a blinded transaction
pub const DO_FEE: u8 = 0x06;

/// Data output payload tag carrying secure-message funding entries
pub const DO_FUND_MSG: u8 = 0x08;

/// Size of one message-funding entry: 20-byte message hash + 4-byte fee
pub const SMSG_FUND_ENTRY_SIZE: usize = 24;

/// Size of a Pedersen commitment
pub const COMMITMENT_SIZE: usize = 33;

/// Size of the compressed public key of an anonymized output
pub const PUBKEY_SIZE: usize = 33;
