//! Error types for sigma protocol construction, execution and communication.
//!
//! Errors follow three broad categories:
//!
//! - [`ConfigError`]s are raised when a protocol object is constructed or fed with inputs
//!   it cannot work with (e.g., a soundness parameter that is too large for the group order).
//!   They are never retried.
//! - [`CheatAttempt`]s signal a syntactic deviation from the protocol by the other party,
//!   such as a challenge of a wrong length.
//! - [`ProtocolError`] wraps the above together with communication failures and misuse
//!   of the API (calling rounds out of order, passing messages of a wrong shape).
//!
//! A proof that simply does not verify is **not** an error; verification methods
//! return `Ok(false)` in this case.

use std::io;

/// Error constructing a protocol object or supplying it with incompatible inputs.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Soundness parameter is zero or is not a multiple of 8.
    #[error("soundness parameter must be a positive multiple of 8, got {0}")]
    UnalignedSoundness(u32),
    /// Soundness parameter violates `2^t < q`.
    #[error(
        "soundness parameter {soundness_bits} is too large for the group order \
         ({order_bits} bits); 2^t < q must hold"
    )]
    SoundnessTooLarge {
        /// Soundness parameter `t` in bits.
        soundness_bits: u32,
        /// Bit length of the group order `q`.
        order_bits: u64,
    },
    /// Soundness parameter is too large for a Damgård–Jurik modulus (`3t < |n|` must hold).
    #[error(
        "soundness parameter {soundness_bits} is too large for a {modulus_bits}-bit modulus; \
         3t < |n| must hold"
    )]
    SoundnessTooLargeForModulus {
        /// Soundness parameter `t` in bits.
        soundness_bits: u32,
        /// Bit length of the modulus `n`.
        modulus_bits: u64,
    },
    /// Group did not pass validation.
    #[error("invalid group: {0}")]
    InvalidGroup(&'static str),
    /// Group parameters could not be parsed.
    #[error("cannot parse group parameter `{name}`")]
    GroupParameter {
        /// Name of the parameter (e.g., `p`).
        name: &'static str,
    },
    /// Composed protocols use different soundness parameters.
    #[error(
        "soundness parameter of branch #{index} ({actual}) differs from the one \
         of the composition ({expected})"
    )]
    SoundnessMismatch {
        /// Zero-based branch index.
        index: usize,
        /// Soundness parameter of the composition.
        expected: u32,
        /// Soundness parameter of the branch.
        actual: u32,
    },
    /// Composition has too few branches.
    #[error("composition requires at least {min} branches, got {actual}")]
    BranchCount {
        /// Minimum number of branches.
        min: usize,
        /// Actual number of branches.
        actual: usize,
    },
    /// Input supplied to a composition has a different number of branches than
    /// the composition itself.
    #[error("input has {actual} branches, while the composition has {expected}")]
    InputBranchCount {
        /// Number of branches in the composition.
        expected: usize,
        /// Number of branches in the input.
        actual: usize,
    },
    /// Input of a wrong kind was supplied to a computation.
    #[error("expected {expected} input, got {actual}")]
    InputMismatch {
        /// Kind of the expected input.
        expected: &'static str,
        /// Kind of the supplied input.
        actual: &'static str,
    },
    /// OR composition input does not contain exactly one real witness.
    #[error("OR composition requires exactly one real witness, got {0}")]
    WitnessCount(usize),
    /// OR composition input indexes are not `0..k` without gaps.
    #[error("OR composition branches must be indexed 0..k without gaps")]
    SparseBranches,
    /// Public input value is not usable by the protocol (e.g., a ciphertext that is not
    /// invertible modulo the Damgård–Jurik modulus).
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

/// Syntactic deviation from the protocol by the other party.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CheatAttempt {
    /// Challenge does not have the length implied by the soundness parameter.
    #[error("challenge has {actual} bytes, expected {expected}")]
    ChallengeLength {
        /// Expected length in bytes (`t / 8`).
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },
}

/// Error executing a sigma protocol.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The other party deviated from the protocol syntax.
    #[error("cheat attempt detected: {0}")]
    CheatAttempt(#[from] CheatAttempt),
    /// Sending or receiving a message has failed.
    #[error("communication failure while {context}")]
    Communication {
        /// Human-readable description of the failed action.
        context: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Received message cannot be decoded.
    #[error("cannot decode {context}")]
    Codec {
        /// Human-readable description of the decoded message.
        context: &'static str,
        /// Underlying decoding error.
        #[source]
        source: bincode::Error,
    },
    /// Message of a wrong shape was supplied to verification.
    #[error("expected {expected} message, got {actual}")]
    MessageMismatch {
        /// Kind of the expected message.
        expected: &'static str,
        /// Kind of the supplied message.
        actual: &'static str,
    },
    /// Method was called in a state where it is not allowed.
    #[error("`{operation}` cannot be called {state}")]
    IllegalState {
        /// Name of the called operation.
        operation: &'static str,
        /// Human-readable description of the current state.
        state: &'static str,
    },
}

impl ProtocolError {
    pub(crate) fn communication(context: &'static str, source: io::Error) -> Self {
        Self::Communication { context, source }
    }

    pub(crate) fn codec(context: &'static str, source: bincode::Error) -> Self {
        Self::Codec { context, source }
    }

    pub(crate) fn illegal_state(operation: &'static str, state: &'static str) -> Self {
        Self::IllegalState { operation, state }
    }

    /// Checks whether this error signals a [`CheatAttempt`].
    pub fn is_cheat_attempt(&self) -> bool {
        matches!(self, Self::CheatAttempt(_))
    }
}
