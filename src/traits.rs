//! Interfaces of per-protocol sigma computations.

use rand_core::CryptoRngCore;

use crate::{
    challenge::random_challenge,
    config::SoundnessParam,
    errors::{CheatAttempt, ProtocolError},
    input::{CommonInput, ProverInput},
    messages::SigmaMessage,
};

/// Prover side of a sigma protocol: algebra without communication.
///
/// A computation can run any number of sequential proofs. Each proof consists of a call to
/// [`Self::compute_first_message()`] followed by a call to [`Self::compute_second_message()`].
/// Ephemeral secrets sampled for the first message are erased once the second message
/// is computed, regardless of whether the computation succeeds.
pub trait SigmaProverComputation<E> {
    /// Returns the soundness parameter.
    fn soundness(&self) -> SoundnessParam;

    /// Samples fresh randomness and computes the first message. Any ephemeral state left
    /// from a previous unfinished proof is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` does not fit the protocol.
    fn compute_first_message(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError>;

    /// Computes the response to `challenge` and erases ephemeral state.
    ///
    /// # Errors
    ///
    /// - Returns a [`CheatAttempt`] if `challenge` is not `t / 8` bytes long.
    /// - Returns an `IllegalState` error if there is no first message to respond to.
    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError>;

    /// Checks whether the computation holds ephemeral secrets of an unfinished proof.
    fn has_pending_state(&self) -> bool;

    /// Erases ephemeral secrets of an unfinished proof, if any.
    fn reset(&mut self);

    /// Returns a simulator for the same protocol and soundness parameter.
    fn simulator(&self) -> Box<dyn SigmaSimulator<E>>;
}

/// Verifier side of a sigma protocol.
pub trait SigmaVerifierComputation<E> {
    /// Returns the soundness parameter.
    fn soundness(&self) -> SoundnessParam;

    /// Samples a random challenge and stores it for verification.
    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8>;

    /// Sets an externally chosen challenge (e.g., in a composed protocol).
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge is not `t / 8` bytes long.
    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt>;

    /// Returns the currently stored challenge.
    fn challenge(&self) -> Option<&[u8]>;

    /// Erases the stored challenge, if any.
    fn reset(&mut self);

    /// Verifies a transcript against the stored challenge, which is erased afterwards.
    ///
    /// Returns `Ok(false)` if the proof does not check out.
    ///
    /// # Errors
    ///
    /// Returns an error if the input or messages have an unexpected shape,
    /// or if no challenge is set.
    fn verify(
        &mut self,
        input: &CommonInput<E>,
        first: &SigmaMessage,
        second: &SigmaMessage,
    ) -> Result<bool, ProtocolError>;
}

/// Transcript produced by a [`SigmaSimulator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTranscript {
    /// First message `a`.
    pub first: SigmaMessage,
    /// Challenge `e`.
    pub challenge: Vec<u8>,
    /// Second message `z`.
    pub second: SigmaMessage,
}

/// Produces accepting transcripts without a witness.
///
/// Implementations sample the second message first, and then solve the verification
/// equation(s) for the first message.
pub trait SigmaSimulator<E> {
    /// Returns the soundness parameter.
    fn soundness(&self) -> SoundnessParam;

    /// Simulates a transcript for the specified challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` does not fit the protocol, or if the challenge has
    /// a wrong length.
    fn simulate_with_challenge(
        &self,
        input: &CommonInput<E>,
        challenge: &[u8],
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError>;

    /// Simulates a transcript for a random challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` does not fit the protocol.
    fn simulate(
        &self,
        input: &CommonInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError> {
        let challenge = random_challenge(self.soundness(), rng);
        self.simulate_with_challenge(input, &challenge, rng)
    }
}

impl<E, T: SigmaProverComputation<E> + ?Sized> SigmaProverComputation<E> for Box<T> {
    fn soundness(&self) -> SoundnessParam {
        (**self).soundness()
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        (**self).compute_first_message(input, rng)
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        (**self).compute_second_message(challenge)
    }

    fn has_pending_state(&self) -> bool {
        (**self).has_pending_state()
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<E>> {
        (**self).simulator()
    }
}

impl<E, T: SigmaVerifierComputation<E> + ?Sized> SigmaVerifierComputation<E> for Box<T> {
    fn soundness(&self) -> SoundnessParam {
        (**self).soundness()
    }

    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8> {
        (**self).sample_challenge(rng)
    }

    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt> {
        (**self).set_challenge(challenge)
    }

    fn challenge(&self) -> Option<&[u8]> {
        (**self).challenge()
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn verify(
        &mut self,
        input: &CommonInput<E>,
        first: &SigmaMessage,
        second: &SigmaMessage,
    ) -> Result<bool, ProtocolError> {
        (**self).verify(input, first, second)
    }
}

impl<E, T: SigmaSimulator<E> + ?Sized> SigmaSimulator<E> for Box<T> {
    fn soundness(&self) -> SoundnessParam {
        (**self).soundness()
    }

    fn simulate_with_challenge(
        &self,
        input: &CommonInput<E>,
        challenge: &[u8],
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError> {
        (**self).simulate_with_challenge(input, challenge, rng)
    }
}

/// Challenge storage shared by verifier computations.
#[derive(Debug, Clone)]
pub(crate) struct ChallengeSlot {
    soundness: SoundnessParam,
    challenge: Option<Vec<u8>>,
}

impl ChallengeSlot {
    pub fn new(soundness: SoundnessParam) -> Self {
        Self {
            soundness,
            challenge: None,
        }
    }

    pub fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    pub fn sample(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8> {
        let challenge = random_challenge(self.soundness, rng);
        self.challenge = Some(challenge.clone());
        challenge
    }

    pub fn set(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt> {
        self.soundness.check_challenge(challenge)?;
        self.challenge = Some(challenge.to_vec());
        Ok(())
    }

    pub fn get(&self) -> Option<&[u8]> {
        self.challenge.as_deref()
    }

    pub fn clear(&mut self) {
        self.challenge = None;
    }

    /// Takes the challenge out for verification, leaving the slot empty.
    pub fn take(&mut self) -> Result<Vec<u8>, ProtocolError> {
        self.challenge
            .take()
            .ok_or_else(|| ProtocolError::illegal_state("verify", "before a challenge is set"))
    }
}
