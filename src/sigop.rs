//! Signature operation counting functions
//!
//! Sig-op cost bounds how much signature checking a block can demand.
//! Legacy and pay-to-script-hash sig-ops are scaled by the witness factor;
//! witness sig-ops are counted at face value.

use crate::coins::CoinLookup;
use crate::constants::{SCRIPT_VERIFY_P2SH, SCRIPT_VERIFY_WITNESS, WITNESS_SCALE_FACTOR};
use crate::error::{ConsensusError, Result};
use crate::script::opcodes::OP_0;
use crate::script::{count_sigops_in_script, is_pay_to_script_hash_any, p2sh_sigop_count};
use crate::transaction::{is_coinbase, is_coinstake};
use crate::types::*;

/// Witness sig-op counting, supplied by the script interpreter
pub trait WitnessSigOpCounter {
    fn count_witness_sigops(
        &self,
        script_sig: &[u8],
        prev_script_pubkey: &[u8],
        witness: &Witness,
        flags: u32,
    ) -> u64;
}

/// Counts sig-ops of version-0 witness programs
///
/// P2WPKH costs one sig-op; P2WSH costs the accurate count of the witness
/// script (the last witness item).
#[derive(Debug, Clone, Copy, Default)]
pub struct WitnessV0Counter;

impl WitnessSigOpCounter for WitnessV0Counter {
    fn count_witness_sigops(
        &self,
        _script_sig: &[u8],
        prev_script_pubkey: &[u8],
        witness: &Witness,
        flags: u32,
    ) -> u64 {
        if (flags & SCRIPT_VERIFY_WITNESS) == 0 {
            return 0;
        }

        // P2WPKH: OP_0 <20-byte-hash>
        if prev_script_pubkey.len() == 22 && prev_script_pubkey[0] == OP_0 && prev_script_pubkey[1] == 0x14 {
            return if witness.is_empty() { 0 } else { 1 };
        }
        // P2WSH: OP_0 <32-byte-hash>
        if prev_script_pubkey.len() == 34 && prev_script_pubkey[0] == OP_0 && prev_script_pubkey[1] == 0x20 {
            return witness
                .last()
                .map(|script| count_sigops_in_script(script, true) as u64)
                .unwrap_or(0);
        }
        0
    }
}

/// Look up the coin spent by input `index`, which must exist and be unspent
fn spent_coin<'a, L: CoinLookup + ?Sized>(
    coins: &'a L,
    input: &TransactionInput,
    index: usize,
) -> Result<&'a Coin> {
    let coin = coins.get(&input.prevout).ok_or_else(|| {
        ConsensusError::ConsensusRuleViolation(format!("no coin for input {index}").into())
    })?;
    debug_assert!(!coin.spent, "coin for input {index} is already spent");
    if coin.spent {
        return Err(ConsensusError::SpentCoin(index));
    }
    Ok(coin)
}

/// Get legacy sigop count from transaction
///
/// Legacy transactions count sigops in every input scriptSig and output
/// script. Typed transactions count only the scripts of their typed outputs.
pub fn get_legacy_sigop_count(tx: &Transaction) -> u32 {
    let mut count = 0u32;

    if !tx.is_typed() {
        for input in &tx.inputs {
            count = count.saturating_add(count_sigops_in_script(&input.script_sig, false));
        }
        for output in &tx.outputs {
            count = count.saturating_add(count_sigops_in_script(&output.script_pubkey, false));
        }
    }

    for script in tx.typed_outputs.iter().filter_map(TypedOutput::script_pubkey) {
        count = count.saturating_add(count_sigops_in_script(script, false));
    }

    count
}

/// Get P2SH sigop count from transaction
///
/// For each non-anonymous input spending a pay-to-script-hash coin (including
/// the coinstake stake branch), counts the sigops of the redeem script.
///
/// # Errors
/// Fails if a spent coin is missing from `coins` or already spent.
pub fn get_p2sh_sigop_count<L: CoinLookup + ?Sized>(tx: &Transaction, coins: &L) -> Result<u32> {
    if is_coinbase(tx) {
        return Ok(0);
    }

    let coinstake = is_coinstake(tx);
    let mut count = 0u32;

    for (i, input) in tx.inputs.iter().enumerate() {
        if input.is_anon() {
            continue;
        }
        let coin = spent_coin(coins, input, i)?;
        if is_pay_to_script_hash_any(&coin.script_pubkey, coinstake) {
            count = count.saturating_add(p2sh_sigop_count(&input.script_sig));
        }
    }

    Ok(count)
}

/// Get total transaction sigop cost
///
/// - Legacy sigops × 4 (witness scale factor)
/// - P2SH sigops × 4 (if `SCRIPT_VERIFY_P2SH` is set)
/// - Witness sigops as reported by `witness_counter`
///
/// Coinbase transactions are charged their legacy cost only.
pub fn get_transaction_sigop_cost<L, W>(
    tx: &Transaction,
    coins: &L,
    witness_counter: &W,
    flags: u32,
) -> Result<u64>
where
    L: CoinLookup + ?Sized,
    W: WitnessSigOpCounter + ?Sized,
{
    let scale = WITNESS_SCALE_FACTOR as u64;
    let mut total_cost = (get_legacy_sigop_count(tx) as u64).saturating_mul(scale);

    if is_coinbase(tx) {
        return Ok(total_cost);
    }

    if (flags & SCRIPT_VERIFY_P2SH) != 0 {
        let p2sh_count = get_p2sh_sigop_count(tx, coins)? as u64;
        total_cost = total_cost.saturating_add(p2sh_count.saturating_mul(scale));
    }

    for (i, input) in tx.inputs.iter().enumerate() {
        if input.is_anon() {
            continue;
        }
        let coin = spent_coin(coins, input, i)?;
        total_cost = total_cost.saturating_add(witness_counter.count_witness_sigops(
            &input.script_sig,
            &coin.script_pubkey,
            &input.witness,
            flags,
        ));
    }

    Ok(total_cost)
}
