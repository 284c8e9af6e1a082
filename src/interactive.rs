//! Orchestrators running sigma protocols over a [`Channel`].
//!
//! [`SigmaProver`] and [`SigmaVerifier`] wrap a protocol computation together with
//! a channel end and drive the three rounds:
//!
//! 1. The prover sends the first message `a` ([`SigmaProver::process_first_message()`]).
//! 2. The verifier receives `a` and sends the challenge `e`
//!    ([`SigmaVerifier::send_challenge()`]).
//! 3. The prover receives `e` and sends the second message `z`
//!    ([`SigmaProver::process_second_message()`]); the verifier receives `z`
//!    and checks the transcript ([`SigmaVerifier::process_verify()`]).
//!
//! Messages are encoded with [`SigmaMessage::to_bytes()`]; the challenge is sent as raw bytes.
//! All calls block on the channel.
//!
//! # Examples
//!
//! ```
//! # use elastic_sigma::{
//! #     group::{DlogGroup, Ristretto}, interactive::{SigmaProver, SigmaVerifier},
//! #     protocols::{DlogProver, DlogVerifier}, CommonInput, MemoryChannel, ProverInput,
//! #     SoundnessParam, Witness,
//! # };
//! # use std::thread;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let group = Ristretto::default();
//! let soundness = SoundnessParam::DEFAULT;
//! let w = group.random_exponent(&mut rand::thread_rng());
//! let common = CommonInput::Dlog { h: group.exponentiate_generator(&w) };
//! let input = ProverInput::new(common.clone(), Witness::exponent(w));
//!
//! let (prover_channel, verifier_channel) = MemoryChannel::pair();
//! let computation = DlogProver::new(group.clone(), soundness)?;
//! let prover_thread = thread::spawn(move || {
//!     let mut prover = SigmaProver::new(computation, prover_channel);
//!     prover.prove(&input, &mut rand::thread_rng())
//! });
//!
//! let computation = DlogVerifier::new(group, soundness)?;
//! let mut verifier = SigmaVerifier::new(computation, verifier_channel);
//! assert!(verifier.verify(&common, &mut rand::thread_rng())?);
//! prover_thread.join().unwrap()?;
//! # Ok(())
//! # }
//! ```

use rand_core::CryptoRngCore;

use crate::{
    channel::Channel,
    errors::{CheatAttempt, ProtocolError},
    input::{CommonInput, ProverInput},
    messages::SigmaMessage,
    traits::{SigmaProverComputation, SigmaVerifierComputation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProverStage {
    Init,
    FirstSent,
}

/// Prover side of an interactive sigma protocol.
#[derive(Debug)]
pub struct SigmaProver<P, C> {
    computation: P,
    channel: C,
    stage: ProverStage,
}

impl<P, C: Channel> SigmaProver<P, C> {
    /// Creates a prover from the protocol computation and a channel to the verifier.
    pub fn new(computation: P, channel: C) -> Self {
        Self {
            computation,
            channel,
            stage: ProverStage::Init,
        }
    }

    /// Returns a reference to the wrapped computation.
    pub fn computation(&self) -> &P {
        &self.computation
    }

    /// Checks whether the first message was sent and the prover waits for a challenge.
    pub fn is_waiting_for_challenge(&self) -> bool {
        self.stage == ProverStage::FirstSent
    }

    /// Splits the prover into the computation and the channel.
    pub fn into_parts(self) -> (P, C) {
        (self.computation, self.channel)
    }

    /// Computes the first message and sends it to the verifier.
    ///
    /// # Errors
    ///
    /// - Returns an `IllegalState` error if the first message was already sent.
    /// - Propagates input errors of the computation and communication errors.
    pub fn process_first_message<E>(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(), ProtocolError>
    where
        P: SigmaProverComputation<E>,
    {
        if self.stage != ProverStage::Init {
            return Err(ProtocolError::illegal_state(
                "process_first_message",
                "after the first message was sent",
            ));
        }

        let message = self.computation.compute_first_message(input, rng)?;
        let bytes = message.to_bytes()?;
        tracing::trace!(kind = message.kind(), len = bytes.len(), "sending first message");
        if let Err(err) = self.channel.send(&bytes) {
            self.computation.reset();
            return Err(ProtocolError::communication("sending first message", err));
        }
        self.stage = ProverStage::FirstSent;
        tracing::debug!(statement = input.common().kind(), "sent first message");
        Ok(())
    }

    /// Receives the challenge, computes the second message and sends it to the verifier.
    ///
    /// # Errors
    ///
    /// - Returns an `IllegalState` error if called before
    ///   [`Self::process_first_message()`].
    /// - Returns a [`CheatAttempt`] if the received challenge has a wrong length.
    /// - Propagates communication errors.
    pub fn process_second_message<E>(&mut self) -> Result<(), ProtocolError>
    where
        P: SigmaProverComputation<E>,
    {
        if self.stage != ProverStage::FirstSent {
            return Err(ProtocolError::illegal_state(
                "process_second_message",
                "before the first message was sent",
            ));
        }
        self.stage = ProverStage::Init;

        let challenge = match self.channel.receive() {
            Ok(challenge) => challenge,
            Err(err) => {
                self.computation.reset();
                return Err(ProtocolError::communication("receiving challenge", err));
            }
        };
        tracing::trace!(len = challenge.len(), "received challenge");
        let message = self.computation.compute_second_message(&challenge)?;
        let bytes = message.to_bytes()?;
        tracing::trace!(kind = message.kind(), len = bytes.len(), "sending second message");
        self.channel
            .send(&bytes)
            .map_err(|err| ProtocolError::communication("sending second message", err))?;
        tracing::debug!("sent second message");
        Ok(())
    }

    /// Runs both prover rounds.
    ///
    /// # Errors
    ///
    /// Propagates errors of [`Self::process_first_message()`] and
    /// [`Self::process_second_message()`].
    pub fn prove<E>(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(), ProtocolError>
    where
        P: SigmaProverComputation<E>,
    {
        self.process_first_message(input, rng)?;
        self.process_second_message::<E>()
    }
}

#[derive(Debug)]
enum VerifierStage {
    Init,
    ChallengeSent { first: SigmaMessage },
}

/// Verifier side of an interactive sigma protocol.
#[derive(Debug)]
pub struct SigmaVerifier<V, C> {
    computation: V,
    channel: C,
    stage: VerifierStage,
}

impl<V, C: Channel> SigmaVerifier<V, C> {
    /// Creates a verifier from the protocol computation and a channel to the prover.
    pub fn new(computation: V, channel: C) -> Self {
        Self {
            computation,
            channel,
            stage: VerifierStage::Init,
        }
    }

    /// Returns a reference to the wrapped computation.
    pub fn computation(&self) -> &V {
        &self.computation
    }

    /// Splits the verifier into the computation and the channel.
    pub fn into_parts(self) -> (V, C) {
        (self.computation, self.channel)
    }

    /// Samples a random challenge for the next proof.
    pub fn sample_challenge<E>(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8>
    where
        V: SigmaVerifierComputation<E>,
    {
        self.computation.sample_challenge(rng)
    }

    /// Sets an externally chosen challenge for the next proof.
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge has a wrong length.
    pub fn set_challenge<E>(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt>
    where
        V: SigmaVerifierComputation<E>,
    {
        self.computation.set_challenge(challenge)
    }

    /// Waits for the first message from the prover, then sends the challenge.
    ///
    /// # Errors
    ///
    /// - Returns an `IllegalState` error if no challenge is set, or if the challenge
    ///   was already sent.
    /// - Propagates communication and decoding errors.
    pub fn send_challenge<E>(&mut self) -> Result<(), ProtocolError>
    where
        V: SigmaVerifierComputation<E>,
    {
        if matches!(self.stage, VerifierStage::ChallengeSent { .. }) {
            return Err(ProtocolError::illegal_state(
                "send_challenge",
                "after the challenge was sent",
            ));
        }
        let challenge = self.computation.challenge().ok_or_else(|| {
            ProtocolError::illegal_state("send_challenge", "before a challenge is set")
        })?;
        let challenge = challenge.to_vec();

        let bytes = match self.channel.receive() {
            Ok(bytes) => bytes,
            Err(err) => {
                self.computation.reset();
                return Err(ProtocolError::communication("receiving first message", err));
            }
        };
        tracing::trace!(len = bytes.len(), "received first message");
        let first = match SigmaMessage::from_bytes(&bytes) {
            Ok(message) => message,
            Err(err) => {
                self.computation.reset();
                return Err(err);
            }
        };
        if let Err(err) = self.channel.send(&challenge) {
            self.computation.reset();
            return Err(ProtocolError::communication("sending challenge", err));
        }
        self.stage = VerifierStage::ChallengeSent { first };
        tracing::debug!("sent challenge");
        Ok(())
    }

    /// Waits for the second message from the prover and verifies the transcript.
    ///
    /// # Errors
    ///
    /// - Returns an `IllegalState` error if called before [`Self::send_challenge()`].
    /// - Propagates communication and decoding errors, and input / message shape errors
    ///   of the computation.
    pub fn process_verify<E>(&mut self, input: &CommonInput<E>) -> Result<bool, ProtocolError>
    where
        V: SigmaVerifierComputation<E>,
    {
        let VerifierStage::ChallengeSent { first } =
            std::mem::replace(&mut self.stage, VerifierStage::Init)
        else {
            return Err(ProtocolError::illegal_state(
                "process_verify",
                "before the challenge was sent",
            ));
        };

        let bytes = match self.channel.receive() {
            Ok(bytes) => bytes,
            Err(err) => {
                self.computation.reset();
                return Err(ProtocolError::communication("receiving second message", err));
            }
        };
        tracing::trace!(len = bytes.len(), "received second message");
        let second = match SigmaMessage::from_bytes(&bytes) {
            Ok(message) => message,
            Err(err) => {
                self.computation.reset();
                return Err(err);
            }
        };

        let is_valid = self.computation.verify(input, &first, &second)?;
        tracing::debug!(statement = input.kind(), is_valid, "verified proof");
        Ok(is_valid)
    }

    /// Runs all verifier rounds with a freshly sampled challenge.
    ///
    /// # Errors
    ///
    /// Propagates errors of [`Self::send_challenge()`] and [`Self::process_verify()`].
    pub fn verify<E>(
        &mut self,
        input: &CommonInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<bool, ProtocolError>
    where
        V: SigmaVerifierComputation<E>,
    {
        self.sample_challenge::<E>(rng);
        self.send_challenge::<E>()?;
        self.process_verify(input)
    }
}
