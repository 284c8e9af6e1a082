//! Protocols defined by converting their inputs into inputs of another protocol.
//!
//! An [`Adapted`] computation owns a delegate computation and an [`InputConversion`].
//! Each call converts the supplied statement (and, on the prover side, the witness)
//! and forwards it to the delegate; messages are forwarded unchanged. Conversions
//! are recomputed for every call and never cached.

use rand_core::CryptoRngCore;

use crate::{
    config::SoundnessParam,
    errors::{CheatAttempt, ConfigError, ProtocolError},
    input::{CommonInput, ProverInput},
    messages::SigmaMessage,
    traits::{
        SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation, SimulatedTranscript,
    },
};

/// Pure mapping from the inputs of an adapted protocol to the inputs of its delegate.
pub trait InputConversion<E> {
    /// Converts a public statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement has an unexpected variant or cannot be converted.
    fn convert_common(&self, input: &CommonInput<E>) -> Result<CommonInput<E>, ConfigError>;

    /// Converts a prover input.
    ///
    /// # Default implementation
    ///
    /// Converts the statement with [`Self::convert_common()`] and keeps the witness as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has an unexpected variant or cannot be converted.
    fn convert_prover(&self, input: &ProverInput<E>) -> Result<ProverInput<E>, ConfigError> {
        let common = self.convert_common(input.common())?;
        Ok(ProverInput::new(common, input.witness().clone()))
    }
}

/// Computation (prover, verifier or simulator) adapted via an [`InputConversion`].
#[derive(Debug, Clone)]
pub struct Adapted<C, P> {
    conversion: C,
    inner: P,
}

impl<C, P> Adapted<C, P> {
    /// Combines a conversion and a delegate computation.
    pub fn from_parts(conversion: C, inner: P) -> Self {
        Self { conversion, inner }
    }

    /// Returns the input conversion.
    pub fn conversion(&self) -> &C {
        &self.conversion
    }

    /// Returns the delegate computation.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<E, C, P> SigmaProverComputation<E> for Adapted<C, P>
where
    E: 'static,
    C: InputConversion<E> + Clone + 'static,
    P: SigmaProverComputation<E>,
{
    fn soundness(&self) -> SoundnessParam {
        self.inner.soundness()
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        let input = match self.conversion.convert_prover(input) {
            Ok(input) => input,
            Err(err) => {
                self.inner.reset();
                return Err(err.into());
            }
        };
        self.inner.compute_first_message(&input, rng)
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        self.inner.compute_second_message(challenge)
    }

    fn has_pending_state(&self) -> bool {
        self.inner.has_pending_state()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<E>> {
        Box::new(Adapted {
            conversion: self.conversion.clone(),
            inner: self.inner.simulator(),
        })
    }
}

impl<E, C, P> SigmaVerifierComputation<E> for Adapted<C, P>
where
    C: InputConversion<E>,
    P: SigmaVerifierComputation<E>,
{
    fn soundness(&self) -> SoundnessParam {
        self.inner.soundness()
    }

    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8> {
        self.inner.sample_challenge(rng)
    }

    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt> {
        self.inner.set_challenge(challenge)
    }

    fn challenge(&self) -> Option<&[u8]> {
        self.inner.challenge()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn verify(
        &mut self,
        input: &CommonInput<E>,
        first: &SigmaMessage,
        second: &SigmaMessage,
    ) -> Result<bool, ProtocolError> {
        let input = match self.conversion.convert_common(input) {
            Ok(input) => input,
            Err(err) => {
                self.inner.reset();
                return Err(err.into());
            }
        };
        self.inner.verify(&input, first, second)
    }
}

impl<E, C, P> SigmaSimulator<E> for Adapted<C, P>
where
    C: InputConversion<E>,
    P: SigmaSimulator<E>,
{
    fn soundness(&self) -> SoundnessParam {
        self.inner.soundness()
    }

    fn simulate_with_challenge(
        &self,
        input: &CommonInput<E>,
        challenge: &[u8],
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError> {
        let input = self.conversion.convert_common(input)?;
        self.inner.simulate_with_challenge(&input, challenge, rng)
    }
}
