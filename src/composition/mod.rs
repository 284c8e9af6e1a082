//! AND and OR composition of sigma protocols.
//!
//! Composed computations hold their branches as trait objects, so branches may use
//! different protocols (e.g., a Dlog statement ORed with a DH tuple statement), and
//! compositions can be nested. All branches must share the same soundness parameter;
//! this is checked on construction.
//!
//! # OR composition
//!
//! The prover knows a witness for exactly one of `k` statements. For every other statement,
//! it runs the simulator with a freshly sampled challenge `e_i`. Once it receives
//! the master challenge `e`, it sets the challenge for the real branch to
//! `e_j = e XOR e_0 XOR ... XOR e_{k-1}` (excluding `e_j` itself) and responds
//! to it honestly. The verifier checks that the branch challenges XOR to `e`
//! and that every branch transcript verifies.
//!
//! # AND composition
//!
//! All branches receive the same challenge; the proof is valid iff all branch proofs
//! are valid.

use crate::{config::SoundnessParam, errors::ConfigError};

mod and;
mod or;

pub use self::{
    and::{SigmaAndProverComputation, SigmaAndSimulator, SigmaAndVerifierComputation},
    or::{SigmaOrProverComputation, SigmaOrSimulator, SigmaOrVerifierComputation},
};

/// Checks that there are enough branches and that all of them share the soundness parameter.
fn common_soundness(
    soundness: impl ExactSizeIterator<Item = SoundnessParam>,
    min_branches: usize,
) -> Result<SoundnessParam, ConfigError> {
    let branch_count = soundness.len();
    if branch_count < min_branches {
        return Err(ConfigError::BranchCount {
            min: min_branches,
            actual: branch_count,
        });
    }

    let mut expected = None;
    for (index, actual) in soundness.enumerate() {
        let expected = *expected.get_or_insert(actual);
        if actual != expected {
            return Err(ConfigError::SoundnessMismatch {
                index,
                expected: expected.bits(),
                actual: actual.bits(),
            });
        }
    }
    expected.ok_or(ConfigError::BranchCount {
        min: min_branches,
        actual: 0,
    })
}

fn check_branch_count(expected: usize, actual: usize) -> Result<(), ConfigError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConfigError::InputBranchCount { expected, actual })
    }
}
