//! # blvm-ct-consensus
//!
//! Transaction consensus checks for a UTXO chain whose outputs may be
//! plaintext, blinded (confidential) or anonymized (ring-confidential).
//!
//! Every check is a pure function of the transaction, a read-only view of
//! prior outputs, immutable chain parameters and an external proof oracle.
//!
//! ## Stages
//!
//! 1. [`transaction::check_transaction`]: context-free structure and per-output rules
//! 2. [`tx_inputs::check_tx_inputs`]: maturity, input kinds, fee and commitment tally
//! 3. [`locktime`] / [`sequence_locks`]: finality and relative lock times
//! 4. [`sigop`]: signature-operation cost
//!
//! ## Usage
//!
//! ```rust
//! use blvm_ct_consensus::config::ValidatorConfig;
//! use blvm_ct_consensus::params::ConsensusParams;
//! use blvm_ct_consensus::proofs::{ProofOracle, ProofSystem};
//! use blvm_ct_consensus::types::*;
//! use blvm_ct_consensus::ConsensusValidator;
//!
//! struct NoProofs;
//!
//! impl ProofOracle for NoProofs {
//!     fn verify_range_proof(&self, _: &Commitment, _: &[u8], _: ProofSystem) -> bool {
//!         false
//!     }
//!     fn commit_plain(&self, _: Integer) -> Option<Commitment> {
//!         None
//!     }
//!     fn verify_tally(&self, _: &[Commitment], _: &[Commitment]) -> bool {
//!         false
//!     }
//! }
//!
//! let validator = ConsensusValidator::new(
//!     ConsensusParams::regtest(),
//!     ValidatorConfig::default(),
//!     NoProofs,
//! );
//! let tx = Transaction {
//!     version: 1,
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint::new([1; 32], 0),
//!         sequence: 0xffff_ffff,
//!         script_sig: vec![],
//!         witness: vec![],
//!     }],
//!     outputs: vec![TransactionOutput { value: 1000, script_pubkey: vec![0x51] }],
//!     typed_outputs: vec![],
//!     lock_time: 0,
//! };
//! assert!(validator.check_transaction(&tx, 0, true).is_ok());
//! ```

pub mod chain;
pub mod coins;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod fees;
pub mod locktime;
pub mod outputs;
pub mod params;
pub mod proofs;
pub mod script;
pub mod sequence_locks;
pub mod serialization;
pub mod sigop;
pub mod transaction;
pub mod tx_inputs;
pub mod types;

use crate::chain::ChainContext;
use crate::coins::CoinLookup;
use crate::config::ValidatorConfig;
use crate::context::ValidationContext;
use crate::error::{Result, TxResult};
use crate::params::ConsensusParams;
use crate::proofs::ProofOracle;
use crate::serialization::calculate_txid;
use crate::sigop::WitnessSigOpCounter;
use crate::tx_inputs::TxInputsOutcome;
use crate::types::{Natural, Transaction};
use tracing::{debug, debug_span};

/// Validator bundling chain parameters, switches and the proof oracle
///
/// A fresh [`ValidationContext`] is built for every call, so one validator
/// can be shared across threads when the oracle allows it.
#[derive(Debug, Clone)]
pub struct ConsensusValidator<O> {
    params: ConsensusParams,
    config: ValidatorConfig,
    oracle: O,
}

fn txid_hex(tx: &Transaction) -> String {
    let mut txid = calculate_txid(tx);
    txid.reverse();
    hex::encode(txid)
}

impl<O: ProofOracle> ConsensusValidator<O> {
    pub fn new(params: ConsensusParams, config: ValidatorConfig, oracle: O) -> Self {
        Self {
            params,
            config,
            oracle,
        }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Context with the rule set active at `time`
    pub fn context(&self, time: i64) -> ValidationContext<'_, O> {
        ValidationContext::at_time(&self.params, &self.config, &self.oracle, time)
    }

    /// Context-free checks, with the rule set active at `time`
    pub fn check_transaction(
        &self,
        tx: &Transaction,
        time: i64,
        check_duplicate_inputs: bool,
    ) -> TxResult<()> {
        let span = debug_span!("check_transaction", txid = %txid_hex(tx));
        let _enter = span.enter();

        let result = transaction::check_transaction(tx, &self.context(time), check_duplicate_inputs);
        if let Err(rejection) = &result {
            debug!(code = rejection.code, category = %rejection.category, "transaction rejected");
        }
        result
    }

    /// Checks against the spent coins, for a spend at `spend_height`
    pub fn check_tx_inputs<L: CoinLookup + ?Sized>(
        &self,
        tx: &Transaction,
        coins: &L,
        spend_height: Natural,
        time: i64,
    ) -> TxResult<TxInputsOutcome> {
        let span = debug_span!("check_tx_inputs", txid = %txid_hex(tx), spend_height);
        let _enter = span.enter();

        let result = tx_inputs::check_tx_inputs(tx, &self.context(time), coins, spend_height);
        if let Err(rejection) = &result {
            debug!(
                code = rejection.code,
                category = %rejection.category,
                detail = rejection.detail.as_deref().unwrap_or(""),
                "transaction inputs rejected"
            );
        }
        result
    }

    /// Weighted sig-op cost of `tx`
    pub fn transaction_sigop_cost<L, W>(
        &self,
        tx: &Transaction,
        coins: &L,
        witness_counter: &W,
        flags: u32,
    ) -> Result<u64>
    where
        L: CoinLookup + ?Sized,
        W: WitnessSigOpCounter + ?Sized,
    {
        sigop::get_transaction_sigop_cost(tx, coins, witness_counter, flags)
    }

    pub fn is_final(&self, tx: &Transaction, block_height: i64, block_time: i64) -> bool {
        locktime::is_final_tx(tx, block_height, block_time)
    }

    /// Whether the relative lock times of `tx` are satisfied in the block `chain` describes
    pub fn sequence_locks<C: ChainContext + ?Sized>(
        &self,
        tx: &Transaction,
        flags: u32,
        prev_heights: &mut [Natural],
        chain: &C,
    ) -> Result<bool> {
        sequence_locks::sequence_locks(tx, flags, prev_heights, chain)
    }
}
