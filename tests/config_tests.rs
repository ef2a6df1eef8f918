//! Loading chain parameters and validator switches

use blvm_ct_consensus::config::ValidatorConfig;
use blvm_ct_consensus::params::{ConsensusParams, MaturityRule};

#[test]
fn test_params_json_roundtrip() {
    let params = ConsensusParams::regtest();
    let json = serde_json::to_string(&params).unwrap();
    let back: ConsensusParams = serde_json::from_str(&json).unwrap();
    assert_eq!(back, params);
}

#[test]
fn test_partial_params_fall_back_to_mainnet() {
    let params: ConsensusParams =
        serde_json::from_str(r#"{"rct_time": 42, "maturity_rule": "fixed"}"#).unwrap();

    let mainnet = ConsensusParams::mainnet();
    assert_eq!(params.rct_time, 42);
    assert_eq!(params.maturity_rule, MaturityRule::Fixed);
    assert_eq!(params.bulletproof_time, mainnet.bulletproof_time);
    assert_eq!(params.coinbase_maturity, mainnet.coinbase_maturity);
    assert_eq!(params.max_block_weight, mainnet.max_block_weight);

    let empty: ConsensusParams = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, mainnet);
}

#[test]
fn test_unknown_maturity_rule_is_an_error() {
    assert!(serde_json::from_str::<ConsensusParams>(r#"{"maturity_rule": "never"}"#).is_err());
}

#[test]
fn test_config_json() {
    let config: ValidatorConfig =
        serde_json::from_str(r#"{"busy_importing": true, "skip_rangeproof": true}"#).unwrap();
    assert!(config.skip_range_proofs());
    assert!(!config.typed_outputs_only);

    let json = serde_json::to_value(config).unwrap();
    assert_eq!(json["typed_outputs_only"], false);
    assert_eq!(serde_json::from_value::<ValidatorConfig>(json).unwrap(), config);
}

// Environment variables are process-wide, so every case lives in one test
#[test]
fn test_config_from_env() {
    std::env::set_var("BLVM_CT_BUSY_IMPORTING", "true");
    std::env::set_var("BLVM_CT_SKIP_RANGEPROOF", "true");
    std::env::set_var("BLVM_CT_TYPED_OUTPUTS_ONLY", "yes");

    let config = ValidatorConfig::from_env();
    assert!(config.busy_importing);
    assert!(config.skip_range_proofs());
    // Unparsable value keeps the default
    assert!(!config.typed_outputs_only);

    std::env::remove_var("BLVM_CT_BUSY_IMPORTING");
    std::env::remove_var("BLVM_CT_SKIP_RANGEPROOF");
    std::env::remove_var("BLVM_CT_TYPED_OUTPUTS_ONLY");

    assert_eq!(ValidatorConfig::from_env(), ValidatorConfig::default());
}
