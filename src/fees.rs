//! Fee rates and virtual transaction size

use crate::constants::{COIN, WITNESS_SCALE_FACTOR};
use crate::serialization::transaction::{serialize_transaction, serialize_transaction_with_witness};
use crate::types::{Integer, Transaction};
use serde::{Deserialize, Serialize};

/// Fee rate in base units per 1000 virtual bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct FeeRate {
    per_k: Integer,
}

impl FeeRate {
    pub fn new(per_k: Integer) -> Self {
        Self { per_k }
    }

    pub fn per_k(&self) -> Integer {
        self.per_k
    }

    /// Fee for `bytes` virtual bytes
    ///
    /// A positive rate never yields a zero fee for a non-empty transaction.
    pub fn fee(&self, bytes: usize) -> Integer {
        let bytes = bytes as i128;
        let fee = (self.per_k as i128 * bytes / 1000).clamp(i64::MIN as i128, i64::MAX as i128) as Integer;
        if fee == 0 && bytes != 0 {
            return self.per_k.signum();
        }
        fee
    }
}

/// Format an amount of base units as whole coins, for reject details
///
/// Always prints at least two decimals: `150000000` formats as `1.50`.
pub fn format_money(amount: Integer) -> String {
    let abs = amount.unsigned_abs();
    let coin = COIN as u64;
    let mut formatted = format!("{}.{:08}", abs / coin, abs % coin);
    let keep = formatted.len() - 6;
    while formatted.len() > keep && formatted.ends_with('0') {
        formatted.pop();
    }
    if amount < 0 {
        formatted.insert(0, '-');
    }
    formatted
}

/// Virtual size: weight divided by the witness scale factor, rounded up
///
/// Weight counts witness-stripped bytes three more times than the full
/// serialization.
pub fn get_virtual_transaction_size(tx: &Transaction) -> usize {
    let stripped = serialize_transaction(tx).len();
    let total = serialize_transaction_with_witness(tx).len();
    let weight = stripped * (WITNESS_SCALE_FACTOR - 1) + total;
    weight.div_ceil(WITNESS_SCALE_FACTOR)
}
