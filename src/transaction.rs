//! Context-free transaction validation
//!
//! `check_transaction` depends only on the transaction, the chain parameters
//! and the active rule set. Checks run in a fixed order and the first
//! failure is returned.

use crate::constants::*;
use crate::context::ValidationContext;
use crate::error::{TxRejection, TxResult};
use crate::outputs::{check_output, check_value};
use crate::proofs::ProofOracle;
use crate::serialization::transaction::serialize_transaction;
use crate::types::*;
use std::collections::HashSet;
use tracing::trace;

#[cold]
fn make_output_total_error() -> TxRejection {
    TxRejection::consensus("bad-txns-txouttotal-toolarge")
}

#[inline]
fn money_range(value: Integer) -> bool {
    (0..=MAX_MONEY).contains(&value)
}

/// Per-kind output counts gathered while checking typed outputs
#[derive(Debug, Default)]
struct OutputCounts {
    standard: usize,
    blind: usize,
    anon: usize,
    data: usize,
}

fn check_typed_outputs<O: ProofOracle + ?Sized>(
    tx: &Transaction,
    ctx: &ValidationContext<'_, O>,
) -> TxResult<()> {
    if tx.typed_outputs.is_empty() {
        return Err(TxRejection::consensus("bad-txns-vpout-empty"));
    }
    if !tx.outputs.is_empty() {
        return Err(TxRejection::consensus("bad-txns-vout-not-empty"));
    }

    let mut counts = OutputCounts::default();
    let mut value_out = 0i64;
    for output in &tx.typed_outputs {
        check_output(ctx, output, &mut value_out)?;
        match output {
            TypedOutput::Standard { .. } => counts.standard += 1,
            TypedOutput::Confidential { .. } => counts.blind += 1,
            TypedOutput::Anonymized { .. } => counts.anon += 1,
            TypedOutput::Data { .. } => counts.data += 1,
        }
        if !money_range(value_out) {
            return Err(make_output_total_error());
        }
    }

    // One extra data output is always allowed for the explicit fee
    let mut max_data_outputs = 1 + counts.standard;
    if ctx.flags.inc_data_outputs {
        max_data_outputs += counts.blind + counts.anon;
    }
    if counts.data > max_data_outputs {
        return Err(TxRejection::consensus("too-many-data-outputs").with_detail(format!(
            "{} data outputs, at most {max_data_outputs} allowed",
            counts.data
        )));
    }

    Ok(())
}

fn check_legacy_outputs<O: ProofOracle + ?Sized>(
    tx: &Transaction,
    ctx: &ValidationContext<'_, O>,
) -> TxResult<()> {
    if ctx.config.typed_outputs_only {
        return Err(TxRejection::consensus("bad-txn-version"));
    }
    if tx.outputs.is_empty() {
        return Err(TxRejection::consensus("bad-txns-vout-empty"));
    }

    let mut value_out = 0i64;
    for output in &tx.outputs {
        check_value(output.value, &mut value_out)?;
        if !money_range(value_out) {
            return Err(make_output_total_error());
        }
    }

    Ok(())
}

/// Check a transaction's structure
///
/// 1. At least one input
/// 2. Witness-stripped size, scaled by the witness factor, within the block weight
/// 3. Outputs: typed outputs checked one by one with the data-output cap, or
///    legacy outputs range-checked (rejected outright in typed-only mode)
/// 4. No duplicate non-anonymous prevouts, when `check_duplicate_inputs` is set
/// 5. Coinbase scriptSig length in `[2, 100]`; otherwise no null prevouts
///
/// Duplicate checking is slow and may be skipped when the caller has already
/// ruled out malleated duplicates (block-level re-checks).
pub fn check_transaction<O: ProofOracle + ?Sized>(
    tx: &Transaction,
    ctx: &ValidationContext<'_, O>,
    check_duplicate_inputs: bool,
) -> TxResult<()> {
    if tx.inputs.is_empty() {
        return Err(TxRejection::consensus("bad-txns-vin-empty"));
    }

    // The witness is excluded: it has not been checked for malleability yet
    let stripped_size = calculate_transaction_size(tx);
    if stripped_size.saturating_mul(WITNESS_SCALE_FACTOR) > ctx.params.max_block_weight {
        return Err(TxRejection::consensus("bad-txns-oversize").with_detail(format!(
            "stripped size {stripped_size} (weight {})",
            stripped_size.saturating_mul(WITNESS_SCALE_FACTOR)
        )));
    }

    if tx.is_typed() {
        check_typed_outputs(tx, ctx)?;
    } else {
        check_legacy_outputs(tx, ctx)?;
    }

    if check_duplicate_inputs {
        let mut seen_prevouts = HashSet::with_capacity(tx.inputs.len());
        for input in tx.inputs.iter().filter(|i| !i.is_anon()) {
            if !seen_prevouts.insert(&input.prevout) {
                return Err(TxRejection::consensus("bad-txns-inputs-duplicate"));
            }
        }
    }

    if is_coinbase(tx) {
        let script_sig_len = tx.inputs[0].script_sig.len();
        if !(MIN_COINBASE_SCRIPT_SIZE..=MAX_COINBASE_SCRIPT_SIZE).contains(&script_sig_len) {
            return Err(TxRejection::consensus("bad-cb-length")
                .with_detail(format!("scriptSig length {script_sig_len}")));
        }
    } else if tx.inputs.iter().any(|i| !i.is_anon() && i.prevout.is_null()) {
        return Err(TxRejection::consensus("bad-txns-prevout-null"));
    }

    trace!(inputs = tx.inputs.len(), stripped_size, "transaction structure valid");
    Ok(())
}

/// Check if transaction is coinbase: a single input with a null prevout
#[inline(always)]
pub fn is_coinbase(tx: &Transaction) -> bool {
    tx.inputs.len() == 1 && tx.inputs[0].prevout.is_null()
}

/// Check if transaction is a coinstake: typed, of coinstake type, with inputs
#[inline(always)]
pub fn is_coinstake(tx: &Transaction) -> bool {
    tx.is_typed() && tx.tx_type() == TxType::Coinstake && !tx.inputs.is_empty()
}

/// Calculate transaction size (non-witness serialization)
///
/// This must match the serialized size exactly: the oversize rule and the
/// virtual size both depend on it.
pub fn calculate_transaction_size(tx: &Transaction) -> usize {
    serialize_transaction(tx).len()
}
