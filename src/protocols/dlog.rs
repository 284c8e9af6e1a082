//! Schnorr proof of knowledge of a discrete log.

use num_bigint::BigUint;
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

fn statement<E>(input: &CommonInput<E>) -> Result<&E, ConfigError> {
    match input {
        CommonInput::Dlog { h } => Ok(h),
        other => Err(other.mismatch("Dlog")),
    }
}

/// Checks `g^z == a * h^e`.
fn equation_holds<G: DlogGroup>(
    group: &G,
    h: &G::Element,
    a: &G::Element,
    challenge: &BigUint,
    z: &BigUint,
) -> bool {
    let lhs = group.exponentiate_generator(z);
    let rhs = group.multiply(a, &group.exponentiate(h, challenge));
    lhs == rhs
}

#[derive(Debug)]
struct ProverState {
    randomness: SecretExponent,
    witness: SecretExponent,
}

/// Prover computation for the knowledge of `w` such that `h = g^w`.
///
/// # Examples
///
/// ```
/// # use elastic_sigma::{
/// #     group::{DlogGroup, Ristretto}, protocols::{DlogProver, DlogVerifier},
/// #     CommonInput, ProverInput, SigmaProverComputation, SigmaVerifierComputation,
/// #     SoundnessParam, Witness,
/// # };
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut rng = rand::thread_rng();
/// let group = Ristretto::default();
/// let w = group.random_exponent(&mut rng);
/// let h = group.exponentiate_generator(&w);
/// let input = ProverInput::new(CommonInput::Dlog { h }, Witness::exponent(w));
///
/// let mut prover = DlogProver::new(group.clone(), SoundnessParam::DEFAULT)?;
/// let mut verifier = DlogVerifier::new(group, SoundnessParam::DEFAULT)?;
/// let first = prover.compute_first_message(&input, &mut rng)?;
/// let challenge = verifier.sample_challenge(&mut rng);
/// let second = prover.compute_second_message(&challenge)?;
/// assert!(verifier.verify(input.common(), &first, &second)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DlogProver<G> {
    group: G,
    soundness: SoundnessParam,
    state: Option<ProverState>,
}

impl<G: DlogGroup> DlogProver<G> {
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

    /// Returns the group this prover works in.
    pub fn group(&self) -> &G {
        &self.group
    }
}

impl<G: DlogGroup + Clone + 'static> SigmaProverComputation<G::Element> for DlogProver<G> {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<G::Element>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        self.state = None;
        statement(input.common())?;
        let witness = exponent_witness(input.witness())?;

        let randomness = SecretExponent::new(self.group.random_exponent(rng));
        let a = self.group.exponentiate_generator(randomness.expose());
        self.state = Some(ProverState {
            randomness,
            witness,
        });
        Ok(SigmaMessage::Element(self.group.serialize_element(&a)))
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
        Box::new(DlogSimulator {
            group: self.group.clone(),
            soundness: self.soundness,
        })
    }
}

/// Verifier computation for the knowledge of a discrete log.
#[derive(Debug)]
pub struct DlogVerifier<G> {
    group: G,
    challenge: ChallengeSlot,
}

impl<G: DlogGroup> DlogVerifier<G> {
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

impl<G: DlogGroup> SigmaVerifierComputation<G::Element> for DlogVerifier<G> {
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
        let h = statement(input)?;
        let a = first.as_element()?;
        let z = second.as_big_int()?;

        let Some(a) = decode_element(&self.group, a) else {
            return Ok(false);
        };
        let e = challenge_to_int(&challenge);
        let is_member = self.group.is_member(h);
        Ok(is_member & equation_holds(&self.group, h, &a, &e, z))
    }
}

/// Simulator for the knowledge of a discrete log: samples `z`, then sets `a = g^z * h^(-e)`.
#[derive(Debug, Clone)]
pub struct DlogSimulator<G> {
    group: G,
    soundness: SoundnessParam,
}

impl<G: DlogGroup> DlogSimulator<G> {
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

impl<G: DlogGroup> SigmaSimulator<G::Element> for DlogSimulator<G> {
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
        let h = statement(input)?;

        let z = self.group.random_exponent(rng);
        let minus_e = negate_exponent(self.group.order(), &challenge_to_int(challenge));
        let a = self
            .group
            .double_exponentiate(&self.group.generator(), &z, h, &minus_e);

        Ok(SimulatedTranscript {
            first: SigmaMessage::Element(self.group.serialize_element(&a)),
            challenge: challenge.to_vec(),
            second: SigmaMessage::BigInt(z),
        })
    }
}
