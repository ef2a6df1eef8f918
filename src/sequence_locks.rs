//! Sequence lock calculation functions (BIP68)
//!
//! Relative lock times are carried in input sequence numbers. A lock is
//! reported with nLockTime semantics: the last height and time at which the
//! transaction is still invalid, `-1` meaning no constraint.

use crate::chain::ChainContext;
use crate::constants::{LOCKTIME_VERIFY_SEQUENCE, SEQUENCE_LOCKTIME_GRANULARITY};
use crate::error::{ConsensusError, Result};
use crate::locktime::{
    extract_sequence_locktime_value, extract_sequence_type_flag, is_sequence_disabled,
};
use crate::types::*;

/// Calculate sequence locks for a transaction (BIP68)
///
/// # Arguments
/// * `tx` - Transaction to calculate locks for
/// * `flags` - Lock-time flags (must include LOCKTIME_VERIFY_SEQUENCE)
/// * `prev_heights` - Height at which each input's coin confirmed. Entries for
///   anonymous and disable-flagged inputs are reset to 0.
/// * `chain` - Block the transaction is evaluated for
///
/// # Returns
/// Pair (min_height, min_time):
/// - min_height: last invalid block height (or -1 if no height constraint)
/// - min_time: last invalid median time-past (or -1 if no time constraint)
pub fn calculate_sequence_locks<C: ChainContext + ?Sized>(
    tx: &Transaction,
    flags: u32,
    prev_heights: &mut [Natural],
    chain: &C,
) -> Result<(i64, i64)> {
    if prev_heights.len() != tx.inputs.len() {
        return Err(ConsensusError::ConsensusRuleViolation(
            format!(
                "prev_heights length {} does not match input count {}",
                prev_heights.len(),
                tx.inputs.len()
            )
            .into(),
        ));
    }

    let mut min_height: i64 = -1;
    let mut min_time: i64 = -1;

    // BIP68 is only enforced for version 2+ transactions and when flag is set
    let enforce_bip68 = tx.version >= 2 && (flags & LOCKTIME_VERIFY_SEQUENCE) != 0;
    if !enforce_bip68 {
        return Ok((min_height, min_time));
    }

    for (input, prev_height) in tx.inputs.iter().zip(prev_heights.iter_mut()) {
        if input.is_anon() || is_sequence_disabled(input.sequence) {
            // Height is irrelevant for this input
            *prev_height = 0;
            continue;
        }

        let coin_height = *prev_height as i64;
        let locktime_value = extract_sequence_locktime_value(input.sequence) as i64;

        if extract_sequence_type_flag(input.sequence) {
            // Measured from the median time-past of the block before the coin's block
            let coin_time =
                chain.ancestor_median_time_past(coin_height.saturating_sub(1).max(0) as Natural);
            let locktime_seconds = locktime_value << SEQUENCE_LOCKTIME_GRANULARITY;

            let required_time = coin_time
                .checked_add(locktime_seconds)
                .and_then(|sum| sum.checked_sub(1))
                .ok_or_else(|| {
                    ConsensusError::ConsensusRuleViolation(
                        "Sequence lock time calculation overflow".into(),
                    )
                })?;

            min_time = min_time.max(required_time);
        } else {
            let required_height = coin_height
                .checked_add(locktime_value)
                .and_then(|sum| sum.checked_sub(1))
                .ok_or_else(|| {
                    ConsensusError::ConsensusRuleViolation(
                        "Sequence lock height calculation overflow".into(),
                    )
                })?;

            debug_assert!(
                required_height >= coin_height.saturating_sub(1),
                "Required height ({required_height}) must be >= coin_height - 1 ({coin_height})"
            );

            min_height = min_height.max(required_height);
        }
    }

    Ok((min_height, min_time))
}

/// Evaluate if sequence locks are satisfied
///
/// Both bounds must lie strictly in the past: the height below the block's
/// own height and the time below its parent's median time-past.
pub fn evaluate_sequence_locks<C: ChainContext + ?Sized>(chain: &C, lock_pair: (i64, i64)) -> bool {
    let (min_height, min_time) = lock_pair;
    let block_time = chain.parent_median_time_past();

    !(min_height >= chain.height() || min_time >= block_time)
}

/// Check if transaction sequence locks are satisfied
///
/// Convenience function combining `calculate_sequence_locks` and
/// `evaluate_sequence_locks`.
pub fn sequence_locks<C: ChainContext + ?Sized>(
    tx: &Transaction,
    flags: u32,
    prev_heights: &mut [Natural],
    chain: &C,
) -> Result<bool> {
    let lock_pair = calculate_sequence_locks(tx, flags, prev_heights, chain)?;
    Ok(evaluate_sequence_locks(chain, lock_pair))
}
