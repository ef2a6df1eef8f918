//! Chain consensus parameters
//!
//! Activation times and policy constants, loaded once at startup and never
//! mutated during validation.

use crate::constants::{COINBASE_MATURITY, MAX_BLOCK_WEIGHT};
use crate::types::Natural;
use serde::{Deserialize, Serialize};

/// How many confirmations a coinbase or coinstake output needs before it can be spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaturityRule {
    /// Always `coinbase_maturity` blocks
    Fixed,
    /// `min(coinbase_maturity, coin_height / 2)`, letting early outputs mature
    /// faster while the chain bootstraps
    #[default]
    HalfHeightBootstrap,
}

impl MaturityRule {
    /// Required confirmation depth for a reward output created at `coin_height`
    pub fn required_depth(self, maturity: Natural, coin_height: Natural) -> Natural {
        match self {
            MaturityRule::Fixed => maturity,
            MaturityRule::HalfHeightBootstrap => maturity.min(coin_height / 2),
        }
    }
}

/// Consensus parameters of one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Outputs using OP_ISCOINSTAKE are rejected before this time
    #[serde(default = "default_op_iscoinstake_time")]
    pub op_iscoinstake_time: i64,

    /// Permit an OP_ISCOINSTAKE script whose spend branch is plain P2PKH
    #[serde(default)]
    pub allow_op_iscoinstake_with_p2pkh: bool,

    /// Range proofs switch to bulletproofs at this time
    #[serde(default = "default_bulletproof_time")]
    pub bulletproof_time: i64,

    /// Anonymized outputs are accepted from this time
    #[serde(default = "default_rct_time")]
    pub rct_time: i64,

    /// Message-funding fee shortfalls are rejected from this time
    #[serde(default = "default_smsg_fee_time")]
    pub smsg_fee_time: i64,

    /// Blinded and anonymized outputs extend the data-output cap from this time
    #[serde(default = "default_inc_data_outputs_time")]
    pub inc_data_outputs_time: i64,

    /// Fee rate (per 1000 virtual bytes) charged on message-funding transactions
    #[serde(default = "default_smsg_fee_funding_tx_per_k")]
    pub smsg_fee_funding_tx_per_k: i64,

    #[serde(default = "default_coinbase_maturity")]
    pub coinbase_maturity: Natural,

    /// Maturity policy applied to typed transactions
    #[serde(default)]
    pub maturity_rule: MaturityRule,

    #[serde(default = "default_max_block_weight")]
    pub max_block_weight: usize,
}

fn default_op_iscoinstake_time() -> i64 {
    1_510_272_000 // 2017-11-10 00:00:00 UTC
}

fn default_bulletproof_time() -> i64 {
    1_561_593_600 // 2019-06-27 00:00:00 UTC
}

fn default_rct_time() -> i64 {
    1_561_593_600
}

fn default_smsg_fee_time() -> i64 {
    1_561_593_600
}

fn default_inc_data_outputs_time() -> i64 {
    1_574_208_000 // 2019-11-20 00:00:00 UTC
}

fn default_smsg_fee_funding_tx_per_k() -> i64 {
    200_000
}

fn default_coinbase_maturity() -> Natural {
    COINBASE_MATURITY
}

fn default_max_block_weight() -> usize {
    MAX_BLOCK_WEIGHT
}

impl ConsensusParams {
    pub fn mainnet() -> Self {
        Self {
            op_iscoinstake_time: default_op_iscoinstake_time(),
            allow_op_iscoinstake_with_p2pkh: false,
            bulletproof_time: default_bulletproof_time(),
            rct_time: default_rct_time(),
            smsg_fee_time: default_smsg_fee_time(),
            inc_data_outputs_time: default_inc_data_outputs_time(),
            smsg_fee_funding_tx_per_k: default_smsg_fee_funding_tx_per_k(),
            coinbase_maturity: default_coinbase_maturity(),
            maturity_rule: MaturityRule::HalfHeightBootstrap,
            max_block_weight: default_max_block_weight(),
        }
    }

    /// Every feature active from genesis
    pub fn regtest() -> Self {
        Self {
            op_iscoinstake_time: 0,
            allow_op_iscoinstake_with_p2pkh: false,
            bulletproof_time: 0,
            rct_time: 0,
            smsg_fee_time: 0,
            inc_data_outputs_time: 0,
            smsg_fee_funding_tx_per_k: default_smsg_fee_funding_tx_per_k(),
            coinbase_maturity: default_coinbase_maturity(),
            maturity_rule: MaturityRule::HalfHeightBootstrap,
            max_block_weight: default_max_block_weight(),
        }
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::mainnet()
    }
}
