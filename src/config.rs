//! Configuration for blvm-ct-consensus
//!
//! Process-level validator switches. These can be loaded from config files,
//! environment variables, or passed programmatically, and are handed to the
//! validator at construction instead of living in process-wide state.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Validator switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidatorConfig {
    /// Node is importing blocks from disk (reindex or bootstrap file)
    #[serde(default)]
    pub busy_importing: bool,

    /// Skip range-proof verification while importing
    /// Has no effect unless `busy_importing` is also set
    #[serde(default)]
    pub skip_rangeproof: bool,

    /// Reject transactions that do not use typed outputs
    #[serde(default)]
    pub typed_outputs_only: bool,
}

impl ValidatorConfig {
    /// Range proofs are skipped only while importing with skipping requested
    #[inline]
    pub fn skip_range_proofs(&self) -> bool {
        self.busy_importing && self.skip_rangeproof
    }

    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `BLVM_CT_<KEY>`:
    /// - `BLVM_CT_BUSY_IMPORTING=true`
    /// - `BLVM_CT_SKIP_RANGEPROOF=true`
    /// - `BLVM_CT_TYPED_OUTPUTS_ONLY=true`
    ///
    /// Unparsable values leave the default in place.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("BLVM_CT_BUSY_IMPORTING") {
            if let Ok(enabled) = val.parse::<bool>() {
                config.busy_importing = enabled;
            }
        }
        if let Ok(val) = std::env::var("BLVM_CT_SKIP_RANGEPROOF") {
            if let Ok(enabled) = val.parse::<bool>() {
                config.skip_rangeproof = enabled;
            }
        }
        if let Ok(val) = std::env::var("BLVM_CT_TYPED_OUTPUTS_ONLY") {
            if let Ok(enabled) = val.parse::<bool>() {
                config.typed_outputs_only = enabled;
            }
        }

        if config.skip_range_proofs() {
            info!("range-proof verification disabled while importing");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_requires_both_switches() {
        let mut config = ValidatorConfig {
            skip_rangeproof: true,
            ..Default::default()
        };
        assert!(!config.skip_range_proofs());

        config.busy_importing = true;
        assert!(config.skip_range_proofs());

        config.skip_rangeproof = false;
        assert!(!config.skip_range_proofs());
    }

    #[test]
    fn test_default_verifies_everything() {
        let config = ValidatorConfig::default();
        assert!(!config.busy_importing);
        assert!(!config.typed_outputs_only);
        assert!(!config.skip_range_proofs());
    }
}
