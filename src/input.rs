//! Public statements and prover witnesses.

use num_bigint::BigUint;

use std::collections::BTreeMap;

use crate::{encryption::DamgardJurikKey, errors::ConfigError, secret::SecretExponent};

/// Which secret an ElGamal encrypted-value prover knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElGamalWitnessKind {
    /// Encryption randomness `r`, such that `c1 = g^r`.
    Randomness,
    /// Receiver's private key `w`, such that `h = g^w`.
    PrivateKey,
}

/// Public statement of a sigma protocol, shared by the prover and the verifier.
///
/// The generator `g` is always the generator of the group the protocol is instantiated with.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CommonInput<E> {
    /// Knowledge of `w` such that `h = g^w`.
    Dlog {
        /// Public element.
        h: E,
    },
    /// Knowledge of `w` such that `u = g^w` and `v = h^w`.
    DhTuple {
        /// Second base.
        h: E,
        /// `g^w`
        u: E,
        /// `h^w`
        v: E,
    },
    /// Knowledge of `w` such that `powers[i] = bases[i]^w` for every `i`.
    DhExtended {
        /// Bases `g_1, ..., g_m`.
        bases: Vec<E>,
        /// Powers `h_1, ..., h_m`.
        powers: Vec<E>,
    },
    /// Knowledge of `(x, r)` such that `commitment = g^r * h^x`.
    PedersenKnowledge {
        /// Commitment key.
        h: E,
        /// Commitment.
        commitment: E,
    },
    /// Knowledge of `r` such that `commitment = g^r * h^value` for a public `value`.
    PedersenCommittedValue {
        /// Commitment key.
        h: E,
        /// Commitment.
        commitment: E,
        /// Committed value.
        value: BigUint,
    },
    /// Knowledge of the private key `w` such that `public_key = g^w`.
    ElGamalCommitmentKnowledge {
        /// ElGamal public key.
        public_key: E,
    },
    /// `(c1, c2) = (g^r, value * public_key^r)`; the prover knows `r`.
    ElGamalCommittedValue {
        /// ElGamal public key.
        public_key: E,
        /// Random element of the ciphertext.
        c1: E,
        /// Blinded element of the ciphertext.
        c2: E,
        /// Committed group element.
        value: E,
    },
    /// `(c1, c2)` encrypts `value` for `public_key`; the prover knows either
    /// the randomness or the private key, as specified by `witness`.
    ElGamalEncryptedValue {
        /// ElGamal public key.
        public_key: E,
        /// Random element of the ciphertext.
        c1: E,
        /// Blinded element of the ciphertext.
        c2: E,
        /// Encrypted group element.
        value: E,
        /// Kind of the prover's witness.
        witness: ElGamalWitnessKind,
    },
    /// `ciphertext` is a Damgård–Jurik encryption of zero; the prover knows its randomness.
    DjEncryptedZero {
        /// Public key.
        key: DamgardJurikKey,
        /// Ciphertext.
        ciphertext: BigUint,
    },
    /// `ciphertext` is a Damgård–Jurik encryption of `plaintext`; the prover knows
    /// its randomness.
    DjEncryptedValue {
        /// Public key.
        key: DamgardJurikKey,
        /// Ciphertext.
        ciphertext: BigUint,
        /// Encrypted value.
        plaintext: BigUint,
    },
    /// Plaintext of `c3` is the product of plaintexts of `c1` and `c2`.
    DjProduct {
        /// Public key.
        key: DamgardJurikKey,
        /// Encryption of `x1`.
        c1: BigUint,
        /// Encryption of `x2`.
        c2: BigUint,
        /// Encryption of `x1 * x2`.
        c3: BigUint,
    },
    /// All statements hold.
    And(Vec<CommonInput<E>>),
    /// At least one statement holds.
    Or(Vec<CommonInput<E>>),
}

impl<E> CommonInput<E> {
    /// Returns a human-readable name of the statement variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dlog { .. } => "Dlog",
            Self::DhTuple { .. } => "DH tuple",
            Self::DhExtended { .. } => "extended DH tuple",
            Self::PedersenKnowledge { .. } => "Pedersen commitment knowledge",
            Self::PedersenCommittedValue { .. } => "Pedersen committed value",
            Self::ElGamalCommitmentKnowledge { .. } => "ElGamal commitment knowledge",
            Self::ElGamalCommittedValue { .. } => "ElGamal committed value",
            Self::ElGamalEncryptedValue { .. } => "ElGamal encrypted value",
            Self::DjEncryptedZero { .. } => "Damgård–Jurik encrypted zero",
            Self::DjEncryptedValue { .. } => "Damgård–Jurik encrypted value",
            Self::DjProduct { .. } => "Damgård–Jurik product",
            Self::And(_) => "AND composition",
            Self::Or(_) => "OR composition",
        }
    }

    pub(crate) fn mismatch(&self, expected: &'static str) -> ConfigError {
        ConfigError::InputMismatch {
            expected,
            actual: self.kind(),
        }
    }
}

/// Secret part of a prover input.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Witness {
    /// Single secret exponent (a discrete log or encryption randomness).
    Exponent(SecretExponent),
    /// Opening of a Pedersen commitment `g^randomness * h^value`.
    Pedersen {
        /// Committed value `x`.
        value: SecretExponent,
        /// Commitment randomness `r`.
        randomness: SecretExponent,
    },
    /// Randomness of a Damgård–Jurik ciphertext.
    DjRandomness(SecretExponent),
    /// Witness for the Damgård–Jurik product statement.
    DjProduct {
        /// Plaintext of `c1`.
        x1: SecretExponent,
        /// Randomness of `c1`.
        r1: SecretExponent,
        /// Randomness of `c2`.
        r2: SecretExponent,
        /// Randomness of `c3`.
        r3: SecretExponent,
    },
    /// Witnesses for each statement of an AND composition.
    And(Vec<Witness>),
    /// Witness for a single statement of an OR composition.
    Or {
        /// Index of the statement.
        index: usize,
        /// Witness for the statement.
        witness: Box<Witness>,
    },
}

impl Witness {
    /// Creates a witness consisting of a single exponent.
    pub fn exponent(value: impl Into<SecretExponent>) -> Self {
        Self::Exponent(value.into())
    }

    /// Returns a human-readable name of the witness variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exponent(_) => "exponent",
            Self::Pedersen { .. } => "Pedersen opening",
            Self::DjRandomness(_) => "Damgård–Jurik randomness",
            Self::DjProduct { .. } => "Damgård–Jurik product witness",
            Self::And(_) => "AND witness",
            Self::Or { .. } => "OR witness",
        }
    }

    pub(crate) fn mismatch(&self, expected: &'static str) -> ConfigError {
        ConfigError::InputMismatch {
            expected,
            actual: self.kind(),
        }
    }
}

/// Prover input: a statement together with a witness for it. Never sent over the wire.
#[derive(Debug, Clone)]
pub struct ProverInput<E> {
    common: CommonInput<E>,
    witness: Witness,
}

impl<E> ProverInput<E> {
    /// Combines a statement and a witness.
    pub fn new(common: CommonInput<E>, witness: Witness) -> Self {
        Self { common, witness }
    }

    /// Returns the public statement.
    pub fn common(&self) -> &CommonInput<E> {
        &self.common
    }

    /// Returns the witness.
    pub fn witness(&self) -> &Witness {
        &self.witness
    }

    /// Creates an input for AND composition.
    pub fn and(inputs: Vec<Self>) -> Self {
        let (commons, witnesses) = inputs
            .into_iter()
            .map(|input| (input.common, input.witness))
            .unzip();
        Self {
            common: CommonInput::And(commons),
            witness: Witness::And(witnesses),
        }
    }

    /// Creates an input for OR composition.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one of `branches` is [real](OrBranch::Real).
    pub fn or(branches: Vec<OrBranch<E>>) -> Result<Self, ConfigError> {
        let real_count = branches.iter().filter(|branch| branch.is_real()).count();
        if real_count != 1 {
            return Err(ConfigError::WitnessCount(real_count));
        }

        let mut real_witness = None;
        let commons = branches
            .into_iter()
            .enumerate()
            .map(|(index, branch)| match branch {
                OrBranch::Real(input) => {
                    real_witness = Some((index, input.witness));
                    input.common
                }
                OrBranch::Simulated(common) => common,
            })
            .collect();
        let (index, witness) = real_witness.ok_or(ConfigError::WitnessCount(0))?;

        Ok(Self {
            common: CommonInput::Or(commons),
            witness: Witness::Or {
                index,
                witness: Box::new(witness),
            },
        })
    }

    /// Creates an input for OR composition from an index map.
    ///
    /// # Errors
    ///
    /// Returns an error if the indexes are not `0..k`, or if the map does not contain
    /// exactly one [real](OrBranch::Real) branch.
    pub fn or_from_map(branches: BTreeMap<usize, OrBranch<E>>) -> Result<Self, ConfigError> {
        let is_contiguous = branches.keys().enumerate().all(|(i, &index)| i == index);
        if !is_contiguous {
            return Err(ConfigError::SparseBranches);
        }
        Self::or(branches.into_values().collect())
    }
}

/// Branch of an OR composition input.
#[derive(Debug, Clone)]
pub enum OrBranch<E> {
    /// Statement for which the prover knows a witness.
    Real(ProverInput<E>),
    /// Statement that will be simulated.
    Simulated(CommonInput<E>),
}

impl<E> OrBranch<E> {
    fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }
}
