//! Chaum–Pedersen proof that `(g, h, u, v)` is a Diffie–Hellman tuple.

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

struct Statement<'a, E> {
    h: &'a E,
    u: &'a E,
    v: &'a E,
}

impl<'a, E> Statement<'a, E> {
    fn new(input: &'a CommonInput<E>) -> Result<Self, ConfigError> {
        match input {
            CommonInput::DhTuple { h, u, v } => Ok(Self { h, u, v }),
            other => Err(other.mismatch("DH tuple")),
        }
    }
}

#[derive(Debug)]
struct ProverState {
    randomness: SecretExponent,
    witness: SecretExponent,
}

/// Prover computation for the knowledge of `w` such that `u = g^w` and `v = h^w`.
#[derive(Debug)]
pub struct DhTupleProver<G> {
    group: G,
    soundness: SoundnessParam,
    state: Option<ProverState>,
}

impl<G: DlogGroup> DhTupleProver<G> {
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

impl<G: DlogGroup + Clone + 'static> SigmaProverComputation<G::Element> for DhTupleProver<G> {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<G::Element>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        self.state = None;
        let statement = Statement::new(input.common())?;
        let witness = exponent_witness(input.witness())?;

        let randomness = SecretExponent::new(self.group.random_exponent(rng));
        let a = self.group.exponentiate_generator(randomness.expose());
        let b = self.group.exponentiate(statement.h, randomness.expose());
        self.state = Some(ProverState {
            randomness,
            witness,
        });
        Ok(SigmaMessage::Dh {
            a: self.group.serialize_element(&a),
            b: self.group.serialize_element(&b),
        })
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
        Box::new(DhTupleSimulator {
            group: self.group.clone(),
            soundness: self.soundness,
        })
    }
}

/// Verifier computation for DH tuples. Checks `g^z == a * u^e` and `h^z == b * v^e`.
#[derive(Debug)]
pub struct DhTupleVerifier<G> {
    group: G,
    challenge: ChallengeSlot,
}

impl<G: DlogGroup> DhTupleVerifier<G> {
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

impl<G: DlogGroup> SigmaVerifierComputation<G::Element> for DhTupleVerifier<G> {
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
        let statement = Statement::new(input)?;
        let (a, b) = first.as_dh()?;
        let z = second.as_big_int()?;

        let group = &self.group;
        let (Some(a), Some(b)) = (decode_element(group, a), decode_element(group, b)) else {
            return Ok(false);
        };
        let e = challenge_to_int(&challenge);

        let members_valid = group.is_member(statement.h)
            & group.is_member(statement.u)
            & group.is_member(statement.v);
        let first_holds = group.exponentiate_generator(z)
            == group.multiply(&a, &group.exponentiate(statement.u, &e));
        let second_holds = group.exponentiate(statement.h, z)
            == group.multiply(&b, &group.exponentiate(statement.v, &e));
        Ok(members_valid & first_holds & second_holds)
    }
}

/// Simulator for DH tuples.
#[derive(Debug, Clone)]
pub struct DhTupleSimulator<G> {
    group: G,
    soundness: SoundnessParam,
}

impl<G: DlogGroup> DhTupleSimulator<G> {
    /// Creates a simulator.
    ///
    /// # Errors
    ///
    /// Returns an error if the group is invalid or if `2^t >= q`.
    pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        check_group(&group, soundness)?;
        Ok(Self { group, soundness })
    }

    fn solve(
        &self,
        base: &G::Element,
        power: &G::Element,
        z: &BigUint,
        minus_e: &BigUint,
    ) -> Vec<u8> {
        let commitment = self.group.double_exponentiate(base, z, power, minus_e);
        self.group.serialize_element(&commitment)
    }
}

impl<G: DlogGroup> SigmaSimulator<G::Element> for DhTupleSimulator<G> {
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
        let statement = Statement::new(input)?;

        let z = self.group.random_exponent(rng);
        let minus_e = negate_exponent(self.group.order(), &challenge_to_int(challenge));
        let a = self.solve(&self.group.generator(), statement.u, &z, &minus_e);
        let b = self.solve(statement.h, statement.v, &z, &minus_e);

        Ok(SimulatedTranscript {
            first: SigmaMessage::Dh { a, b },
            challenge: challenge.to_vec(),
            second: SigmaMessage::BigInt(z),
        })
    }
}
