//! Non-interactive proofs obtained from sigma protocols via the Fiat–Shamir heuristic.
//!
//! The challenge is derived from a [`Transcript`] absorbing the statement and the first
//! message. Any [`SigmaProverComputation`] / [`SigmaVerifierComputation`] pair can be used,
//! including [compositions](crate::composition).
//!
//! # Examples
//!
//! ```
//! # use elastic_sigma::{
//! #     group::{DlogGroup, Ristretto}, protocols::{DhTupleProver, DhTupleVerifier},
//! #     CommonInput, NonInteractiveProof, ProverInput, SoundnessParam, Witness,
//! # };
//! # use merlin::Transcript;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rng = rand::thread_rng();
//! let group = Ristretto::default();
//! let w = group.random_exponent(&mut rng);
//! let h = group.exponentiate_generator(&group.random_exponent(&mut rng));
//! let common = CommonInput::DhTuple {
//!     u: group.exponentiate_generator(&w),
//!     v: group.exponentiate(&h, &w),
//!     h,
//! };
//! let input = ProverInput::new(common.clone(), Witness::exponent(w));
//!
//! let mut prover = DhTupleProver::new(group.clone(), SoundnessParam::DEFAULT)?;
//! let proof = NonInteractiveProof::new(
//!     &group,
//!     &mut prover,
//!     &input,
//!     &mut Transcript::new(b"test_proof"),
//!     &mut rng,
//! )?;
//!
//! let mut verifier = DhTupleVerifier::new(group.clone(), SoundnessParam::DEFAULT)?;
//! let transcript = &mut Transcript::new(b"test_proof");
//! assert!(proof.verify(&group, &mut verifier, &common, transcript)?);
//! # Ok(())
//! # }
//! ```

use merlin::Transcript;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    config::SoundnessParam,
    encryption::DamgardJurikKey,
    errors::ProtocolError,
    group::DlogGroup,
    input::{CommonInput, ElGamalWitnessKind, ProverInput},
    messages::SigmaMessage,
    traits::{SigmaProverComputation, SigmaVerifierComputation},
};

/// Extension trait for Merlin transcripts absorbing sigma protocol data.
trait TranscriptForSigma {
    fn start_proof(&mut self, soundness: SoundnessParam);

    fn append_element<G: DlogGroup>(
        &mut self,
        group: &G,
        label: &'static [u8],
        element: &G::Element,
    );

    fn append_int(&mut self, label: &'static [u8], value: &BigUint);

    fn append_dj_key(&mut self, key: &DamgardJurikKey);

    fn append_input<G: DlogGroup>(&mut self, group: &G, input: &CommonInput<G::Element>);

    fn challenge(&mut self, soundness: SoundnessParam) -> Vec<u8>;
}

impl TranscriptForSigma for Transcript {
    fn start_proof(&mut self, soundness: SoundnessParam) {
        self.append_message(b"dom-sep", b"sigma_proof");
        self.append_u64(b"t", soundness.bits().into());
    }

    fn append_element<G: DlogGroup>(
        &mut self,
        group: &G,
        label: &'static [u8],
        element: &G::Element,
    ) {
        self.append_message(label, &group.serialize_element(element));
    }

    fn append_int(&mut self, label: &'static [u8], value: &BigUint) {
        self.append_message(label, &value.to_bytes_be());
    }

    fn append_dj_key(&mut self, key: &DamgardJurikKey) {
        self.append_int(b"n", key.modulus());
        self.append_u64(b"s", key.length().into());
    }

    fn append_input<G: DlogGroup>(&mut self, group: &G, input: &CommonInput<G::Element>) {
        self.append_message(b"statement", input.kind().as_bytes());
        match input {
            CommonInput::Dlog { h } => self.append_element(group, b"h", h),
            CommonInput::DhTuple { h, u, v } => {
                self.append_element(group, b"h", h);
                self.append_element(group, b"u", u);
                self.append_element(group, b"v", v);
            }
            CommonInput::DhExtended { bases, powers } => {
                self.append_u64(b"len", bases.len() as u64);
                for base in bases {
                    self.append_element(group, b"base", base);
                }
                self.append_u64(b"len", powers.len() as u64);
                for power in powers {
                    self.append_element(group, b"power", power);
                }
            }
            CommonInput::PedersenKnowledge { h, commitment } => {
                self.append_element(group, b"h", h);
                self.append_element(group, b"commitment", commitment);
            }
            CommonInput::PedersenCommittedValue {
                h,
                commitment,
                value,
            } => {
                self.append_element(group, b"h", h);
                self.append_element(group, b"commitment", commitment);
                self.append_int(b"value", value);
            }
            CommonInput::ElGamalCommitmentKnowledge { public_key } => {
                self.append_element(group, b"public_key", public_key);
            }
            CommonInput::ElGamalCommittedValue {
                public_key,
                c1,
                c2,
                value,
            } => {
                self.append_element(group, b"public_key", public_key);
                self.append_element(group, b"c1", c1);
                self.append_element(group, b"c2", c2);
                self.append_element(group, b"value", value);
            }
            CommonInput::ElGamalEncryptedValue {
                public_key,
                c1,
                c2,
                value,
                witness,
            } => {
                self.append_element(group, b"public_key", public_key);
                self.append_element(group, b"c1", c1);
                self.append_element(group, b"c2", c2);
                self.append_element(group, b"value", value);
                let witness_tag: &[u8] = match witness {
                    ElGamalWitnessKind::Randomness => b"randomness",
                    ElGamalWitnessKind::PrivateKey => b"private_key",
                };
                self.append_message(b"witness", witness_tag);
            }
            CommonInput::DjEncryptedZero { key, ciphertext } => {
                self.append_dj_key(key);
                self.append_int(b"c", ciphertext);
            }
            CommonInput::DjEncryptedValue {
                key,
                ciphertext,
                plaintext,
            } => {
                self.append_dj_key(key);
                self.append_int(b"c", ciphertext);
                self.append_int(b"x", plaintext);
            }
            CommonInput::DjProduct { key, c1, c2, c3 } => {
                self.append_dj_key(key);
                self.append_int(b"c1", c1);
                self.append_int(b"c2", c2);
                self.append_int(b"c3", c3);
            }
            CommonInput::And(statements) | CommonInput::Or(statements) => {
                self.append_u64(b"len", statements.len() as u64);
                for statement in statements {
                    self.append_input(group, statement);
                }
            }
        }
    }

    fn challenge(&mut self, soundness: SoundnessParam) -> Vec<u8> {
        let mut challenge = vec![0_u8; soundness.byte_len()];
        self.challenge_bytes(b"challenge", &mut challenge);
        challenge
    }
}

fn derive_challenge<G: DlogGroup>(
    group: &G,
    soundness: SoundnessParam,
    input: &CommonInput<G::Element>,
    first: &SigmaMessage,
    transcript: &mut Transcript,
) -> Result<Vec<u8>, ProtocolError> {
    transcript.start_proof(soundness);
    transcript.append_input(group, input);
    transcript.append_message(b"first", &first.to_bytes()?);
    Ok(transcript.challenge(soundness))
}

/// Non-interactive proof consisting of both messages of a sigma protocol. The challenge
/// is not stored; it is recomputed during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonInteractiveProof {
    first: SigmaMessage,
    second: SigmaMessage,
}

impl NonInteractiveProof {
    /// Creates a proof using the specified prover computation.
    ///
    /// # Errors
    ///
    /// Propagates errors of the computation (e.g., if `input` does not fit it).
    pub fn new<G, P>(
        group: &G,
        prover: &mut P,
        input: &ProverInput<G::Element>,
        transcript: &mut Transcript,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Self, ProtocolError>
    where
        G: DlogGroup,
        P: SigmaProverComputation<G::Element> + ?Sized,
    {
        let first = prover.compute_first_message(input, rng)?;
        let soundness = prover.soundness();
        let challenge = match derive_challenge(group, soundness, input.common(), &first, transcript)
        {
            Ok(challenge) => challenge,
            Err(err) => {
                prover.reset();
                return Err(err);
            }
        };
        let second = prover.compute_second_message(&challenge)?;
        Ok(Self { first, second })
    }

    /// Returns the first message of the proof.
    pub fn first_message(&self) -> &SigmaMessage {
        &self.first
    }

    /// Returns the second message of the proof.
    pub fn second_message(&self) -> &SigmaMessage {
        &self.second
    }

    /// Verifies this proof using the specified verifier computation. `transcript` must be
    /// in the same state as the one used when creating the proof.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` or proof messages have an unexpected shape.
    pub fn verify<G, V>(
        &self,
        group: &G,
        verifier: &mut V,
        input: &CommonInput<G::Element>,
        transcript: &mut Transcript,
    ) -> Result<bool, ProtocolError>
    where
        G: DlogGroup,
        V: SigmaVerifierComputation<G::Element> + ?Sized,
    {
        let soundness = verifier.soundness();
        let challenge = derive_challenge(group, soundness, input, &self.first, transcript)?;
        verifier.set_challenge(&challenge)?;
        verifier.verify(input, &self.first, &self.second)
    }
}
