//! Error types for consensus validation
//!
//! Rule violations are reported as [`TxRejection`]s carrying a stable reason
//! code. [`ConsensusError`] is reserved for broken caller contracts and
//! malformed wire data.

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// How a rejected transaction should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectCategory {
    /// Deterministic rule violation; the transaction is permanently invalid.
    Consensus,
    /// Prior outputs are not visible yet; the transaction may become valid later.
    MissingInputs,
    /// Coinbase or coinstake output spent before it matured.
    PrematureSpend,
}

impl fmt::Display for RejectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectCategory::Consensus => write!(f, "consensus"),
            RejectCategory::MissingInputs => write!(f, "missing-inputs"),
            RejectCategory::PrematureSpend => write!(f, "premature-spend"),
        }
    }
}

/// A transaction rejection with its wire-visible reason code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct TxRejection {
    pub category: RejectCategory,
    pub code: &'static str,
    pub detail: Option<Cow<'static, str>>,
}

impl TxRejection {
    /// Consensus rejection without detail
    #[cold]
    pub fn consensus(code: &'static str) -> Self {
        Self {
            category: RejectCategory::Consensus,
            code,
            detail: None,
        }
    }

    #[cold]
    pub fn missing_inputs(code: &'static str) -> Self {
        Self {
            category: RejectCategory::MissingInputs,
            code,
            detail: None,
        }
    }

    #[cold]
    pub fn premature_spend(code: &'static str) -> Self {
        Self {
            category: RejectCategory::PrematureSpend,
            code,
            detail: None,
        }
    }

    /// Attach a formatted detail string
    pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// True for rejections that may resolve once more of the chain is known
    pub fn is_transient(&self) -> bool {
        self.category == RejectCategory::MissingInputs
    }
}

impl fmt::Display for TxRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.code, detail),
            None => write!(f, "{}", self.code),
        }
    }
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConsensusError {
    #[error("Serialization error: {0}")]
    Serialization(Cow<'static, str>),

    #[error("Consensus rule violation: {0}")]
    ConsensusRuleViolation(Cow<'static, str>),

    #[error("Spent coin observed for input {0}")]
    SpentCoin(usize),

    #[error("Transaction rejected: {0}")]
    Rejected(#[from] TxRejection),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Result of a single validation rule
pub type TxResult<T> = std::result::Result<T, TxRejection>;
