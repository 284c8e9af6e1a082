//! Concrete sigma protocols.
//!
//! Every protocol comes as a triple of a prover computation, a verifier computation
//! and a simulator. All of them check the soundness parameter on construction: for
//! protocols over a [`DlogGroup`] of order `q`, `2^t < q` must hold.
//!
//! | Statement | Prover | First message | Second message |
//! |-----------|--------|---------------|----------------|
//! | `h = g^w` | [`DlogProver`] | `a = g^r` | `z = r + e*w` |
//! | `u = g^w, v = h^w` | [`DhTupleProver`] | `(g^r, h^r)` | `z = r + e*w` |
//! | `h_i = g_i^w` | [`DhExtendedProver`] | `g_i^r` for all `i` | `z = r + e*w` |
//! | `c = g^r h^x` | [`PedersenProver`] | `h^alpha g^beta` | `(alpha + e*x, beta + e*r)` |
//! | `c = Enc(0; r)` | [`DjEncryptedZeroProver`] | `rho^N` | `rho * r^e mod n` |
//! | `c3 = Enc(x1 * x2)` | [`DjProductProver`] | `(a1, a2)` | `(z1, z2, z3)` |
//!
//! Commitment-related statements are handled by [adapters](adapter) converting them
//! to one of the statements above.

use num_bigint::BigUint;

use crate::{
    config::SoundnessParam,
    errors::{ConfigError, ProtocolError},
    group::DlogGroup,
    input::Witness,
    secret::SecretExponent,
};

pub mod adapter;
mod damgard_jurik;
mod dh_extended;
mod dh_tuple;
mod dlog;
mod elgamal;
mod pedersen;

pub use self::{
    damgard_jurik::{
        DjEncryptedValueProver, DjEncryptedValueSimulator, DjEncryptedValueVerifier,
        DjEncryptedZeroProver, DjEncryptedZeroSimulator, DjEncryptedZeroVerifier,
        DjProductProver, DjProductSimulator, DjProductVerifier, DjValueConversion,
    },
    dh_extended::{DhExtendedProver, DhExtendedSimulator, DhExtendedVerifier},
    dh_tuple::{DhTupleProver, DhTupleSimulator, DhTupleVerifier},
    dlog::{DlogProver, DlogSimulator, DlogVerifier},
    elgamal::{
        ElGamalCommitmentKnowledgeProver, ElGamalCommitmentKnowledgeSimulator,
        ElGamalCommitmentKnowledgeVerifier, ElGamalCommittedValueProver,
        ElGamalCommittedValueSimulator, ElGamalCommittedValueVerifier,
        ElGamalEncryptedValueProver, ElGamalEncryptedValueSimulator,
        ElGamalEncryptedValueVerifier, ElGamalKnowledgeConversion, ElGamalValueConversion,
    },
    pedersen::{
        PedersenCommittedValueProver, PedersenCommittedValueSimulator,
        PedersenCommittedValueVerifier, PedersenProver, PedersenSimulator,
        PedersenValueConversion, PedersenVerifier,
    },
};

pub(crate) use self::pedersen::commit as pedersen_commit;

/// Checks that `group` is valid and large enough for `soundness`.
pub(crate) fn check_group<G: DlogGroup>(
    group: &G,
    soundness: SoundnessParam,
) -> Result<(), ConfigError> {
    soundness.check_order(group.order())?;
    if group.validate_group() {
        Ok(())
    } else {
        Err(ConfigError::InvalidGroup("group parameters failed validation"))
    }
}

/// Checks the challenge length, logging rejected challenges.
pub(crate) fn check_challenge(
    soundness: SoundnessParam,
    challenge: &[u8],
) -> Result<(), ProtocolError> {
    soundness.check_challenge(challenge).map_err(|err| {
        tracing::warn!(%err, "rejected challenge");
        ProtocolError::from(err)
    })
}

pub(crate) fn no_first_message() -> ProtocolError {
    ProtocolError::illegal_state("compute_second_message", "before the first message")
}

/// Computes `randomness + challenge * witness mod order`.
pub(crate) fn response(
    order: &BigUint,
    randomness: &SecretExponent,
    challenge: &BigUint,
    witness: &SecretExponent,
) -> BigUint {
    (randomness.expose() + challenge * witness.expose()) % order
}

/// Extracts a single exponent witness.
pub(crate) fn exponent_witness(witness: &Witness) -> Result<SecretExponent, ConfigError> {
    match witness {
        Witness::Exponent(exponent) => Ok(exponent.clone()),
        other => Err(other.mismatch("exponent")),
    }
}

/// Decodes an element from a message; returns `None` (i.e., failed verification)
/// for invalid encodings.
pub(crate) fn decode_element<G: DlogGroup>(group: &G, bytes: &[u8]) -> Option<G::Element> {
    let element = group.reconstruct_element(bytes);
    if element.is_none() {
        tracing::debug!(len = bytes.len(), "message contains an invalid group element");
    }
    element
}
