//! Validation context
//!
//! The immutable bundle threaded by reference through every check: chain
//! parameters, validator switches, the active rule set and the proof oracle.

use crate::config::ValidatorConfig;
use crate::params::ConsensusParams;
use crate::proofs::{ProofOracle, ProofSystem};

/// Snapshot of which rule set is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivationFlags {
    pub bulletproofs_active: bool,
    pub rct_active: bool,
    pub enforce_smsg_fees: bool,
    /// Blinded and anonymized outputs count toward the data-output cap
    pub inc_data_outputs: bool,
}

impl ActivationFlags {
    /// Rule set in force at `time` (block time or adjusted network time)
    pub fn at(params: &ConsensusParams, time: i64) -> Self {
        Self {
            bulletproofs_active: time >= params.bulletproof_time,
            rct_active: time >= params.rct_time,
            enforce_smsg_fees: time >= params.smsg_fee_time,
            inc_data_outputs: time >= params.inc_data_outputs_time,
        }
    }

    pub fn proof_system(&self) -> ProofSystem {
        if self.bulletproofs_active {
            ProofSystem::Bulletproof
        } else {
            ProofSystem::Legacy
        }
    }
}

/// Everything a check needs besides the transaction itself
pub struct ValidationContext<'a, O: ?Sized> {
    pub params: &'a ConsensusParams,
    pub config: &'a ValidatorConfig,
    pub flags: ActivationFlags,
    /// Network-adjusted time, used by the OP_ISCOINSTAKE activation gate
    pub adjusted_time: i64,
    pub oracle: &'a O,
}

impl<O: ?Sized> Clone for ValidationContext<'_, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O: ?Sized> Copy for ValidationContext<'_, O> {}

impl<O: ?Sized> std::fmt::Debug for ValidationContext<'_, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("params", self.params)
            .field("config", self.config)
            .field("flags", &self.flags)
            .field("adjusted_time", &self.adjusted_time)
            .finish_non_exhaustive()
    }
}

impl<'a, O: ProofOracle + ?Sized> ValidationContext<'a, O> {
    /// Context whose flags are derived from `time`, also used as the adjusted time
    pub fn at_time(
        params: &'a ConsensusParams,
        config: &'a ValidatorConfig,
        oracle: &'a O,
        time: i64,
    ) -> Self {
        Self {
            params,
            config,
            flags: ActivationFlags::at(params, time),
            adjusted_time: time,
            oracle,
        }
    }

    pub fn with_flags(mut self, flags: ActivationFlags) -> Self {
        self.flags = flags;
        self
    }
}
