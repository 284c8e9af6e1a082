//! Interactive [sigma protocols] with AND / OR composition over pluggable discrete-log groups.
//!
//! # ⚠ Warnings
//!
//! While the logic in this crate relies on standard cryptographic assumptions
//! (complexity of discrete log and decisional Diffie–Hellman problems in certain groups,
//! and the decisional composite residuosity assumption for Damgård–Jurik protocols),
//! it has not been independently verified for correctness or absence of side-channel
//! attack vectors. Big-integer arithmetic used for exponents is **not** constant-time.
//! **Use at your own risk.**
//!
//! # Overview
//!
//! A sigma protocol is a 3-round proof of knowledge: the prover sends a commitment `a`,
//! the verifier responds with a random challenge `e` of `t` bits, and the prover answers
//! with `z`. The crate splits each protocol into layers:
//!
//! - [`SigmaProverComputation`], [`SigmaVerifierComputation`] and [`SigmaSimulator`]
//!   implement the algebra of a specific protocol without any communication.
//!   The [`protocols`] module contains implementations for the Dlog, DH tuple, extended
//!   DH tuple, Pedersen commitment, ElGamal commitment and Damgård–Jurik statements.
//! - [`composition`] combines computations: the OR composition proves knowledge of a witness
//!   for one of several statements without revealing which; the AND composition proves
//!   all of them under a single challenge.
//! - [`interactive`] orchestrators drive computations over a [`Channel`], enforcing
//!   the round order.
//! - [`NonInteractiveProof`] applies the Fiat–Shamir heuristic via [`merlin`] transcripts.
//!
//! Statements and witnesses are described by [`CommonInput`] and [`ProverInput`], messages
//! by [`SigmaMessage`]. The soundness parameter `t` ([`SoundnessParam`]) is fixed
//! on construction of every computation and must satisfy `2^t < q` for the group order `q`.
//!
//! # Backends
//!
//! [`group`] module exposes the [`DlogGroup`] capability consumed by all protocols,
//! and several implementations:
//!
//! - [`ZpGroup`]: prime-order subgroup of `Z_p^*`.
//! - [`Ristretto`]: the ristretto255 group based on Curve25519.
//! - [`Generic`]: any elliptic curve group conforming to the traits specified by
//!   the [`elliptic-curve`] crate. For example, the secp256k1 curve can be used
//!   via the [`k256`] crate.
//!
//! # Crate features
//!
//! ## `curve25519-dalek`
//!
//! *(on by default)*
//!
//! Implements [`DlogGroup`] for ristretto255 using the [`curve25519-dalek`] crate.
//!
//! ## `elliptic-curve`
//!
//! *(off by default)*
//!
//! Implements [`DlogGroup`] for elliptic curves from the RustCrypto ecosystem.
//!
//! # Serialization
//!
//! Messages, non-interactive proofs and configuration implement
//! [`Serialize`](::serde::Serialize) / [`Deserialize`](::serde::Deserialize).
//! Byte buffers (serialized group elements, challenges) are represented in human-readable
//! formats as base64-url strings without padding; for binary formats, they are serialized
//! directly. Channels use `bincode` for messages.
//!
//! [sigma protocols]: https://www.cs.au.dk/~ivan/Sigma.pdf
//! [`ZpGroup`]: group::ZpGroup
//! [`Ristretto`]: group::Ristretto
//! [`Generic`]: group::Generic
//! [`curve25519-dalek`]: https://docs.rs/curve25519-dalek/
//! [`elliptic-curve`]: https://docs.rs/elliptic-curve/
//! [`k256`]: https://docs.rs/k256/

// Documentation settings.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/elastic-sigma/0.1.0")]
// Linter settings.
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

pub mod challenge;
pub mod channel;
pub mod composition;
pub mod config;
mod encryption;
pub mod errors;
mod fiat_shamir;
pub mod group;
mod input;
pub mod interactive;
mod keys;
mod messages;
pub mod protocols;
mod secret;
mod serde;
mod traits;

pub use crate::{
    channel::{Channel, MemoryChannel, StreamChannel},
    config::{ProtocolConfig, SoundnessParam},
    encryption::{Ciphertext, DamgardJurikKey, PedersenCommitment},
    errors::{CheatAttempt, ConfigError, ProtocolError},
    fiat_shamir::NonInteractiveProof,
    group::DlogGroup,
    input::{CommonInput, ElGamalWitnessKind, OrBranch, ProverInput, Witness},
    keys::{Keypair, PublicKey, SecretKey},
    messages::{SigmaMessage, MAX_NESTING_DEPTH},
    secret::SecretExponent,
    traits::{
        SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation, SimulatedTranscript,
    },
};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
