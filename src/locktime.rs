//! Absolute lock-time finality and BIP68 sequence-field helpers

use crate::constants::*;
use crate::types::*;

/// Locktime type (block height vs timestamp)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocktimeType {
    /// Block height locktime (< LOCKTIME_THRESHOLD)
    BlockHeight,
    /// Unix timestamp locktime (>= LOCKTIME_THRESHOLD)
    Timestamp,
}

/// Determine locktime type from value
///
/// If locktime < 500000000, it's block height; otherwise it's Unix timestamp.
pub fn get_locktime_type(locktime: u32) -> LocktimeType {
    if locktime < LOCKTIME_THRESHOLD {
        LocktimeType::BlockHeight
    } else {
        LocktimeType::Timestamp
    }
}

/// Check if transaction is final
///
/// A transaction is final if:
/// 1. `lock_time == 0`, OR
/// 2. the lock time (a height below `LOCKTIME_THRESHOLD`, otherwise a Unix
///    time) is strictly below `block_height` / `block_time`, OR
/// 3. every input carries the `SEQUENCE_FINAL` sentinel.
pub fn is_final_tx(tx: &Transaction, block_height: i64, block_time: i64) -> bool {
    if tx.lock_time == 0 {
        return true;
    }

    let cutoff = match get_locktime_type(tx.lock_time) {
        LocktimeType::BlockHeight => block_height,
        LocktimeType::Timestamp => block_time,
    };
    if (tx.lock_time as i64) < cutoff {
        return true;
    }

    tx.inputs.iter().all(|input| input.sequence == SEQUENCE_FINAL)
}

/// BIP68: Extract relative locktime type flag from sequence number
///
/// Bit 22 (0x00400000) indicates locktime type:
/// - 0 = block-based relative locktime
/// - 1 = time-based relative locktime
pub fn extract_sequence_type_flag(sequence: u32) -> bool {
    (sequence & SEQUENCE_LOCKTIME_TYPE_FLAG) != 0
}

/// BIP68: Extract relative locktime value from sequence number
///
/// Masks out flags (bits 31, 22) and returns only the locktime value (bits 0-15).
pub fn extract_sequence_locktime_value(sequence: u32) -> u16 {
    (sequence & SEQUENCE_LOCKTIME_MASK) as u16
}

/// BIP68: Check if sequence number has disabled bit set
///
/// Bit 31 (0x80000000) disables relative locktime when set.
pub fn is_sequence_disabled(sequence: u32) -> bool {
    (sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG) != 0
}
