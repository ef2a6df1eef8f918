//! Range-proof and commitment oracle
//!
//! Elliptic-curve arithmetic lives outside this crate. Validation only needs
//! three primitive answers from it, expressed by [`ProofOracle`].

use crate::types::{Commitment, Integer};

/// Range-proof system in force for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofSystem {
    /// Borromean ring-signature range proofs
    Legacy,
    /// Aggregated logarithmic-size range proofs
    Bulletproof,
}

/// Cryptographic primitives consumed by validation
///
/// Implementations must be deterministic and free of side effects; the
/// validator may call them any number of times for the same arguments.
pub trait ProofOracle {
    /// True if `proof` shows the value hidden in `commitment` lies in range
    fn verify_range_proof(&self, commitment: &Commitment, proof: &[u8], system: ProofSystem) -> bool;

    /// Commitment to `value` with a zero blinding factor, `None` if it cannot be built
    fn commit_plain(&self, value: Integer) -> Option<Commitment>;

    /// True if the inputs and outputs commit to the same total
    fn verify_tally(&self, inputs: &[Commitment], outputs: &[Commitment]) -> bool;
}

impl<T: ProofOracle + ?Sized> ProofOracle for &T {
    fn verify_range_proof(&self, commitment: &Commitment, proof: &[u8], system: ProofSystem) -> bool {
        (**self).verify_range_proof(commitment, proof, system)
    }

    fn commit_plain(&self, value: Integer) -> Option<Commitment> {
        (**self).commit_plain(value)
    }

    fn verify_tally(&self, inputs: &[Commitment], outputs: &[Commitment]) -> bool {
        (**self).verify_tally(inputs, outputs)
    }
}
