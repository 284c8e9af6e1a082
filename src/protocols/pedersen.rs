//! Protocols for Pedersen commitments `c = g^r * h^x`.

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use super::{
    adapter::{Adapted, InputConversion},
    check_challenge, check_group, decode_element, no_first_message, response, DlogProver,
    DlogSimulator, DlogVerifier,
};
use crate::{
    challenge::challenge_to_int,
    config::SoundnessParam,
    errors::{CheatAttempt, ConfigError, ProtocolError},
    group::{negate_exponent, DlogGroup},
    input::{CommonInput, ProverInput, Witness},
    messages::SigmaMessage,
    secret::SecretExponent,
    traits::{
        ChallengeSlot, SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation,
        SimulatedTranscript,
    },
};

fn statement<E>(input: &CommonInput<E>) -> Result<(&E, &E), ConfigError> {
    match input {
        CommonInput::PedersenKnowledge { h, commitment } => Ok((h, commitment)),
        other => Err(other.mismatch("Pedersen commitment knowledge")),
    }
}

#[derive(Debug)]
struct ProverState {
    alpha: SecretExponent,
    beta: SecretExponent,
    value: SecretExponent,
    randomness: SecretExponent,
}

/// Prover computation for the knowledge of an opening `(x, r)` of a Pedersen commitment.
///
/// The first message is `a = h^alpha * g^beta`, and the second one is
/// [`SigmaMessage::Pedersen`] with `u = alpha + e*x` and `v = beta + e*r`.
#[derive(Debug)]
pub struct PedersenProver<G> {
    group: G,
    soundness: SoundnessParam,
    state: Option<ProverState>,
}

impl<G: DlogGroup> PedersenProver<G> {
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

impl<G: DlogGroup + Clone + 'static> SigmaProverComputation<G::Element> for PedersenProver<G> {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<G::Element>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        self.state = None;
        let (h, _) = statement(input.common())?;
        let Witness::Pedersen { value, randomness } = input.witness() else {
            return Err(input.witness().mismatch("Pedersen opening").into());
        };

        let alpha = SecretExponent::new(self.group.random_exponent(rng));
        let beta = SecretExponent::new(self.group.random_exponent(rng));
        let generator = self.group.generator();
        let a = self
            .group
            .double_exponentiate(h, alpha.expose(), &generator, beta.expose());
        self.state = Some(ProverState {
            alpha,
            beta,
            value: value.clone(),
            randomness: randomness.clone(),
        });
        Ok(SigmaMessage::Element(self.group.serialize_element(&a)))
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        let state = self.state.take().ok_or_else(no_first_message)?;
        check_challenge(self.soundness, challenge)?;

        let e = challenge_to_int(challenge);
        let order = self.group.order();
        Ok(SigmaMessage::Pedersen {
            u: response(order, &state.alpha, &e, &state.value),
            v: response(order, &state.beta, &e, &state.randomness),
        })
    }

    fn has_pending_state(&self) -> bool {
        self.state.is_some()
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<G::Element>> {
        Box::new(PedersenSimulator {
            group: self.group.clone(),
            soundness: self.soundness,
        })
    }
}

/// Verifier computation for the knowledge of a Pedersen commitment opening.
/// Checks `h^u * g^v == a * c^e`.
#[derive(Debug)]
pub struct PedersenVerifier<G> {
    group: G,
    challenge: ChallengeSlot,
}

impl<G: DlogGroup> PedersenVerifier<G> {
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

impl<G: DlogGroup> SigmaVerifierComputation<G::Element> for PedersenVerifier<G> {
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
        let (h, commitment) = statement(input)?;
        let a = first.as_element()?;
        let (u, v) = second.as_pedersen()?;

        let group = &self.group;
        let Some(a) = decode_element(group, a) else {
            return Ok(false);
        };
        let e = challenge_to_int(&challenge);
        let lhs = group.double_exponentiate(h, u, &group.generator(), v);
        let rhs = group.multiply(&a, &group.exponentiate(commitment, &e));
        Ok(group.is_member(h) & group.is_member(commitment) & (lhs == rhs))
    }
}

/// Simulator for the knowledge of a Pedersen commitment opening.
#[derive(Debug, Clone)]
pub struct PedersenSimulator<G> {
    group: G,
    soundness: SoundnessParam,
}

impl<G: DlogGroup> PedersenSimulator<G> {
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

impl<G: DlogGroup> SigmaSimulator<G::Element> for PedersenSimulator<G> {
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
        let (h, commitment) = statement(input)?;

        let group = &self.group;
        let u = group.random_exponent(rng);
        let v = group.random_exponent(rng);
        let minus_e = negate_exponent(group.order(), &challenge_to_int(challenge));
        let a = group.multiply(
            &group.double_exponentiate(h, &u, &group.generator(), &v),
            &group.exponentiate(commitment, &minus_e),
        );

        Ok(SimulatedTranscript {
            first: SigmaMessage::Element(group.serialize_element(&a)),
            challenge: challenge.to_vec(),
            second: SigmaMessage::Pedersen { u, v },
        })
    }
}

/// Converts `(h, c, x)` such that `c = g^r * h^x` into the Dlog statement `c * h^(-x) = g^r`.
#[derive(Debug, Clone)]
pub struct PedersenValueConversion<G> {
    group: G,
}

impl<G: DlogGroup> InputConversion<G::Element> for PedersenValueConversion<G> {
    fn convert_common(
        &self,
        input: &CommonInput<G::Element>,
    ) -> Result<CommonInput<G::Element>, ConfigError> {
        let CommonInput::PedersenCommittedValue {
            h,
            commitment,
            value,
        } = input
        else {
            return Err(input.mismatch("Pedersen committed value"));
        };
        let minus_value = negate_exponent(self.group.order(), value);
        let blinding = self.group.exponentiate(h, &minus_value);
        Ok(CommonInput::Dlog {
            h: self.group.multiply(commitment, &blinding),
        })
    }
}

/// Prover for the knowledge of the randomness `r` of a Pedersen commitment to a public value.
/// The witness is [`Witness::Exponent`] with `r`.
pub type PedersenCommittedValueProver<G> = Adapted<PedersenValueConversion<G>, DlogProver<G>>;
/// Verifier for the knowledge of the randomness of a Pedersen commitment to a public value.
pub type PedersenCommittedValueVerifier<G> = Adapted<PedersenValueConversion<G>, DlogVerifier<G>>;
/// Simulator for the knowledge of the randomness of a Pedersen commitment to a public value.
pub type PedersenCommittedValueSimulator<G> =
    Adapted<PedersenValueConversion<G>, DlogSimulator<G>>;

impl<G: DlogGroup + Clone> PedersenCommittedValueProver<G> {
    /// Creates a prover.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is invalid or if `2^t >= q`.
    pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        let inner = DlogProver::new(group.clone(), soundness)?;
        Ok(Self::from_parts(PedersenValueConversion { group }, inner))
    }
}

impl<G: DlogGroup + Clone> PedersenCommittedValueVerifier<G> {
    /// Creates a verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is invalid or if `2^t >= q`.
    pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        let inner = DlogVerifier::new(group.clone(), soundness)?;
        Ok(Self::from_parts(PedersenValueConversion { group }, inner))
    }
}

impl<G: DlogGroup + Clone> PedersenCommittedValueSimulator<G> {
    /// Creates a simulator.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is invalid or if `2^t >= q`.
    pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        let inner = DlogSimulator::new(group.clone(), soundness)?;
        Ok(Self::from_parts(PedersenValueConversion { group }, inner))
    }
}

/// Computes `g^r * h^x`.
pub(crate) fn commit<G: DlogGroup>(
    group: &G,
    h: &G::Element,
    value: &BigUint,
    randomness: &BigUint,
) -> G::Element {
    group.double_exponentiate(&group.generator(), randomness, h, value)
}
