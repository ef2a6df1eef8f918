//! Per-output validation, dispatched by output kind

use crate::constants::*;
use crate::context::ValidationContext;
use crate::error::{TxRejection, TxResult};
use crate::proofs::ProofOracle;
use crate::script::{has_is_coinstake_op, is_spend_script_p2pkh};
use crate::types::*;
use tracing::debug;

/// Reason codes of one blinded output kind
struct BlindRejects {
    kind: &'static str,
    ephem_size: &'static str,
    rangeproof_size: &'static str,
    rangeproof_verify: &'static str,
}

const CT_REJECTS: BlindRejects = BlindRejects {
    kind: "ct",
    ephem_size: "bad-ctout-ephem-size",
    rangeproof_size: "bad-ctout-rangeproof-size",
    rangeproof_verify: "bad-ctout-rangeproof-verify",
};

const RCT_REJECTS: BlindRejects = BlindRejects {
    kind: "rct",
    ephem_size: "bad-rctout-ephem-size",
    rangeproof_size: "bad-rctout-rangeproof-size",
    rangeproof_verify: "bad-rctout-rangeproof-verify",
};

/// Check a plaintext value and add it to the running output total
///
/// The caller range-checks the running total after every output.
pub fn check_value(value: Integer, value_out: &mut Integer) -> TxResult<()> {
    if value < 0 {
        return Err(TxRejection::consensus("bad-txns-vout-negative"));
    }
    if value > MAX_MONEY {
        return Err(TxRejection::consensus("bad-txns-vout-toolarge"));
    }
    *value_out = value_out.saturating_add(value);
    Ok(())
}

/// Check a Standard typed output
pub fn check_standard_output<O: ProofOracle + ?Sized>(
    ctx: &ValidationContext<'_, O>,
    value: Integer,
    script_pubkey: &[u8],
    value_out: &mut Integer,
) -> TxResult<()> {
    check_value(value, value_out)?;

    if has_is_coinstake_op(script_pubkey) {
        if ctx.adjusted_time < ctx.params.op_iscoinstake_time {
            return Err(TxRejection::consensus("bad-txns-vout-opiscoinstake"));
        }
        if !ctx.params.allow_op_iscoinstake_with_p2pkh && is_spend_script_p2pkh(script_pubkey) {
            return Err(TxRejection::consensus("bad-txns-vout-opiscoinstake-spend-p2pkh"));
        }
    }

    Ok(())
}

fn check_blinded<O: ProofOracle + ?Sized>(
    ctx: &ValidationContext<'_, O>,
    rejects: &BlindRejects,
    commitment: &Commitment,
    data: &[u8],
    range_proof: &[u8],
) -> TxResult<()> {
    if !(MIN_EPHEMERAL_DATA_SIZE..=MAX_EPHEMERAL_DATA_SIZE).contains(&data.len()) {
        return Err(TxRejection::consensus(rejects.ephem_size));
    }
    if !(MIN_RANGEPROOF_SIZE..=MAX_RANGEPROOF_SIZE).contains(&range_proof.len()) {
        return Err(TxRejection::consensus(rejects.rangeproof_size));
    }

    if ctx.config.skip_range_proofs() {
        return Ok(());
    }

    let system = ctx.flags.proof_system();
    let valid = ctx.oracle.verify_range_proof(commitment, range_proof, system);
    debug!(
        kind = rejects.kind,
        ?system,
        proof_len = range_proof.len(),
        valid,
        "range proof verified"
    );
    if !valid {
        return Err(TxRejection::consensus(rejects.rangeproof_verify));
    }

    Ok(())
}

/// Check a Confidential output: size bounds, then the range proof
pub fn check_blind_output<O: ProofOracle + ?Sized>(
    ctx: &ValidationContext<'_, O>,
    commitment: &Commitment,
    data: &[u8],
    range_proof: &[u8],
) -> TxResult<()> {
    check_blinded(ctx, &CT_REJECTS, commitment, data, range_proof)
}

/// Check an Anonymized output; only accepted once anonymized outputs are active
pub fn check_anon_output<O: ProofOracle + ?Sized>(
    ctx: &ValidationContext<'_, O>,
    commitment: &Commitment,
    data: &[u8],
    range_proof: &[u8],
) -> TxResult<()> {
    if !ctx.flags.rct_active {
        return Err(TxRejection::consensus("rctout-before-active"));
    }
    check_blinded(ctx, &RCT_REJECTS, commitment, data, range_proof)
}

pub fn check_data_output(data: &[u8]) -> TxResult<()> {
    if !(MIN_DATA_OUTPUT_SIZE..=MAX_DATA_OUTPUT_SIZE).contains(&data.len()) {
        return Err(TxRejection::consensus("bad-output-data-size"));
    }
    Ok(())
}

/// Validate one typed output, adding any plaintext value to `value_out`
pub fn check_output<O: ProofOracle + ?Sized>(
    ctx: &ValidationContext<'_, O>,
    output: &TypedOutput,
    value_out: &mut Integer,
) -> TxResult<()> {
    match output {
        TypedOutput::Standard { value, script_pubkey } => {
            check_standard_output(ctx, *value, script_pubkey, value_out)
        }
        TypedOutput::Confidential {
            commitment,
            data,
            range_proof,
            ..
        } => check_blind_output(ctx, commitment, data, range_proof),
        TypedOutput::Anonymized {
            commitment,
            data,
            range_proof,
            ..
        } => check_anon_output(ctx, commitment, data, range_proof),
        TypedOutput::Data { data } => check_data_output(data),
    }
}
