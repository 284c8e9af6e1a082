//! Proof that `h_i = g_i^w` for several bases `g_i` and a single exponent `w`.

use rand_core::CryptoRngCore;

use super::{
    check_challenge, check_group, decode_element, exponent_witness, no_first_message, response,
};
use crate::{
    challenge::challenge_to_int,
    config::SoundnessParam,
    errors::{CheatAttempt, ConfigError, ProtocolError},
    group::{negate_exponent, DlogGroup},
    input::{CommonInput, ProverInput},
    messages::SigmaMessage,
    secret::SecretExponent,
    traits::{
        ChallengeSlot, SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation,
        SimulatedTranscript,
    },
};

fn statement<E>(input: &CommonInput<E>) -> Result<(&[E], &[E]), ConfigError> {
    match input {
        CommonInput::DhExtended { bases, powers } => {
            if bases.is_empty() || bases.len() != powers.len() {
                Err(ConfigError::InvalidInput(
                    "bases and powers must be non-empty and have equal lengths",
                ))
            } else {
                Ok((bases, powers))
            }
        }
        other => Err(other.mismatch("extended DH tuple")),
    }
}

#[derive(Debug)]
struct ProverState {
    randomness: SecretExponent,
    witness: SecretExponent,
}

/// Prover computation for the knowledge of `w` such that `h_i = g_i^w` for all `i`.
///
/// The first message is [`SigmaMessage::Multiple`] with a commitment `a_i = g_i^r` per base,
/// and the second message is a single response `z = r + e*w mod q`.
#[derive(Debug)]
pub struct DhExtendedProver<G> {
    group: G,
    soundness: SoundnessParam,
    state: Option<ProverState>,
}

impl<G: DlogGroup> DhExtendedProver<G> {
    /// Creates a prover.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is invalid or if `2^t >= q`.
    pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        check_group(&group, soundness)?;
        Ok(Self {
            group,
            soundness,
            state: None,
        })
    }
}

impl<G: DlogGroup + Clone + 'static> SigmaProverComputation<G::Element> for DhExtendedProver<G> {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<G::Element>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        self.state = None;
        let (bases, _) = statement(input.common())?;
        let witness = exponent_witness(input.witness())?;

        let randomness = SecretExponent::new(self.group.random_exponent(rng));
        let commitments = bases
            .iter()
            .map(|base| {
                let commitment = self.group.exponentiate(base, randomness.expose());
                SigmaMessage::Element(self.group.serialize_element(&commitment))
            })
            .collect();
        self.state = Some(ProverState {
            randomness,
            witness,
        });
        Ok(SigmaMessage::Multiple(commitments))
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        let state = self.state.take().ok_or_else(no_first_message)?;
        check_challenge(self.soundness, challenge)?;

        let e = challenge_to_int(challenge);
        let z = response(self.group.order(), &state.randomness, &e, &state.witness);
        Ok(SigmaMessage::BigInt(z))
    }

    fn has_pending_state(&self) -> bool {
        self.state.is_some()
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<G::Element>> {
        Box::new(DhExtendedSimulator {
            group: self.group.clone(),
            soundness: self.soundness,
        })
    }
}

/// Verifier computation for extended DH tuples.
#[derive(Debug)]
pub struct DhExtendedVerifier<G> {
    group: G,
    challenge: ChallengeSlot,
}

impl<G: DlogGroup> DhExtendedVerifier<G> {
    /// Creates a verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is invalid or if `2^t >= q`.
    pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        check_group(&group, soundness)?;
        Ok(Self {
            group,
            challenge: ChallengeSlot::new(soundness),
        })
    }
}

impl<G: DlogGroup> SigmaVerifierComputation<G::Element> for DhExtendedVerifier<G> {
    fn soundness(&self) -> SoundnessParam {
        self.challenge.soundness()
    }

    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8> {
        self.challenge.sample(rng)
    }

    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt> {
        self.challenge.set(challenge)
    }

    fn challenge(&self) -> Option<&[u8]> {
        self.challenge.get()
    }

    fn reset(&mut self) {
        self.challenge.clear();
    }

    fn verify(
        &mut self,
        input: &CommonInput<G::Element>,
        first: &SigmaMessage,
        second: &SigmaMessage,
    ) -> Result<bool, ProtocolError> {
        let challenge = self.challenge.take()?;
        let (bases, powers) = statement(input)?;
        let commitments = first.as_multiple()?;
        let z = second.as_big_int()?;
        if commitments.len() != bases.len() {
            tracing::debug!(
                expected = bases.len(),
                actual = commitments.len(),
                "unexpected number of commitments"
            );
            return Ok(false);
        }

        let group = &self.group;
        let e = challenge_to_int(&challenge);
        let mut is_valid = true;
        for ((base, power), commitment) in bases.iter().zip(powers).zip(commitments) {
            let commitment = commitment.as_element()?;
            let Some(commitment) = decode_element(group, commitment) else {
                return Ok(false);
            };
            let lhs = group.exponentiate(base, z);
            let rhs = group.multiply(&commitment, &group.exponentiate(power, &e));
            is_valid &= group.is_member(base) & group.is_member(power) & (lhs == rhs);
        }
        Ok(is_valid)
    }
}

/// Simulator for extended DH tuples.
#[derive(Debug, Clone)]
pub struct DhExtendedSimulator<G> {
    group: G,
    soundness: SoundnessParam,
}

impl<G: DlogGroup> DhExtendedSimulator<G> {
    /// Creates a simulator.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is invalid or if `2^t >= q`.
    pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        check_group(&group, soundness)?;
        Ok(Self { group, soundness })
    }
}

impl<G: DlogGroup> SigmaSimulator<G::Element> for DhExtendedSimulator<G> {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn simulate_with_challenge(
        &self,
        input: &CommonInput<G::Element>,
        challenge: &[u8],
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError> {
        check_challenge(self.soundness, challenge)?;
        let (bases, powers) = statement(input)?;

        let z = self.group.random_exponent(rng);
        let minus_e = negate_exponent(self.group.order(), &challenge_to_int(challenge));
        let commitments = bases
            .iter()
            .zip(powers)
            .map(|(base, power)| {
                let commitment = self.group.double_exponentiate(base, &z, power, &minus_e);
                SigmaMessage::Element(self.group.serialize_element(&commitment))
            })
            .collect();

        Ok(SimulatedTranscript {
            first: SigmaMessage::Multiple(commitments),
            challenge: challenge.to_vec(),
            second: SigmaMessage::BigInt(z),
        })
    }
}
