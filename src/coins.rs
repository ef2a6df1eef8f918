//! Read-only view of prior outputs
//!
//! The coin database is owned by the caller and treated as an immutable
//! snapshot for the duration of one transaction check.

use crate::types::{Coin, OutPoint, Transaction};
use std::collections::HashMap;

/// Map-backed coin view, used by tests and simple callers
pub type CoinSet = HashMap<OutPoint, Coin>;

/// Trait for prior-output lookups
///
/// Lets validation run against any coin store without copying it.
pub trait CoinLookup {
    /// Look up a coin by outpoint.
    fn get(&self, outpoint: &OutPoint) -> Option<&Coin>;

    /// True if every non-anonymous input has an unspent coin in the view
    fn have_inputs(&self, tx: &Transaction) -> bool {
        tx.inputs
            .iter()
            .filter(|input| !input.is_anon())
            .all(|input| matches!(self.get(&input.prevout), Some(coin) if !coin.spent))
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CoinLookup for CoinSet {
    #[inline]
    fn get(&self, outpoint: &OutPoint) -> Option<&Coin> {
        HashMap::get(self, outpoint)
    }

    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

impl<T: CoinLookup + ?Sized> CoinLookup for &T {
    #[inline]
    fn get(&self, outpoint: &OutPoint) -> Option<&Coin> {
        (**self).get(outpoint)
    }

    #[inline]
    fn have_inputs(&self, tx: &Transaction) -> bool {
        (**self).have_inputs(tx)
    }

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }
}
