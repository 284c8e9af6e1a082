//! AND composition.

use rand_core::CryptoRngCore;

use super::{check_branch_count, common_soundness};
use crate::{
    config::SoundnessParam,
    errors::{CheatAttempt, ConfigError, ProtocolError},
    input::{CommonInput, ProverInput, Witness},
    messages::SigmaMessage,
    protocols::{check_challenge, no_first_message},
    traits::{
        ChallengeSlot, SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation,
        SimulatedTranscript,
    },
};

fn and_statement<E>(input: &CommonInput<E>) -> Result<&[CommonInput<E>], ConfigError> {
    match input {
        CommonInput::And(statements) => Ok(statements),
        other => Err(other.mismatch("AND composition")),
    }
}

/// Prover computation for the AND composition of several statements.
///
/// All branches respond to the same challenge. Both messages are [`SigmaMessage::Multiple`]
/// with the branch messages in the branch order.
pub struct SigmaAndProverComputation<E> {
    branches: Vec<Box<dyn SigmaProverComputation<E>>>,
    soundness: SoundnessParam,
    is_pending: bool,
}

impl<E> std::fmt::Debug for SigmaAndProverComputation<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SigmaAndProverComputation")
            .field("branches", &self.branches.len())
            .field("soundness", &self.soundness)
            .field("is_pending", &self.is_pending)
            .finish()
    }
}

impl<E> SigmaAndProverComputation<E> {
    /// Creates an AND composition of the specified branches.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no branches, or if the branches have
    /// differing soundness parameters.
    pub fn new(branches: Vec<Box<dyn SigmaProverComputation<E>>>) -> Result<Self, ConfigError> {
        let soundness = common_soundness(branches.iter().map(|branch| branch.soundness()), 1)?;
        Ok(Self {
            branches,
            soundness,
            is_pending: false,
        })
    }

    fn erase(&mut self) {
        self.is_pending = false;
        for branch in &mut self.branches {
            branch.reset();
        }
    }
}

impl<E: 'static> SigmaProverComputation<E> for SigmaAndProverComputation<E>
where
    CommonInput<E>: Clone,
{
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        self.erase();
        let statements = and_statement(input.common())?;
        check_branch_count(self.branches.len(), statements.len())?;
        let Witness::And(witnesses) = input.witness() else {
            return Err(input.witness().mismatch("AND witness").into());
        };
        check_branch_count(self.branches.len(), witnesses.len())?;

        let mut messages = Vec::with_capacity(statements.len());
        let branch_inputs = statements.iter().zip(witnesses);
        for (branch, (statement, witness)) in self.branches.iter_mut().zip(branch_inputs) {
            let branch_input = ProverInput::new(statement.clone(), witness.clone());
            match branch.compute_first_message(&branch_input, rng) {
                Ok(message) => messages.push(message),
                Err(err) => {
                    self.erase();
                    return Err(err);
                }
            }
        }
        self.is_pending = true;
        Ok(SigmaMessage::Multiple(messages))
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        if !self.is_pending {
            return Err(no_first_message());
        }
        self.is_pending = false;
        if let Err(err) = check_challenge(self.soundness, challenge) {
            self.erase();
            return Err(err);
        }

        // Every branch is called even if a previous one has failed, so that all of them
        // erase their ephemeral state.
        let responses: Vec<_> = self
            .branches
            .iter_mut()
            .map(|branch| branch.compute_second_message(challenge))
            .collect();
        let responses = responses.into_iter().collect::<Result<_, _>>()?;
        Ok(SigmaMessage::Multiple(responses))
    }

    fn has_pending_state(&self) -> bool {
        self.is_pending || self.branches.iter().any(|branch| branch.has_pending_state())
    }

    fn reset(&mut self) {
        self.erase();
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<E>> {
        Box::new(SigmaAndSimulator {
            branches: self.branches.iter().map(|branch| branch.simulator()).collect(),
            soundness: self.soundness,
        })
    }
}

/// Verifier computation for the AND composition of several statements.
pub struct SigmaAndVerifierComputation<E> {
    branches: Vec<Box<dyn SigmaVerifierComputation<E>>>,
    challenge: ChallengeSlot,
}

impl<E> std::fmt::Debug for SigmaAndVerifierComputation<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SigmaAndVerifierComputation")
            .field("branches", &self.branches.len())
            .field("challenge", &self.challenge)
            .finish()
    }
}

impl<E> SigmaAndVerifierComputation<E> {
    /// Creates an AND composition of the specified branches.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no branches, or if the branches have
    /// differing soundness parameters.
    pub fn new(
        branches: Vec<Box<dyn SigmaVerifierComputation<E>>>,
    ) -> Result<Self, ConfigError> {
        let soundness = common_soundness(branches.iter().map(|branch| branch.soundness()), 1)?;
        Ok(Self {
            branches,
            challenge: ChallengeSlot::new(soundness),
        })
    }
}

impl<E> SigmaVerifierComputation<E> for SigmaAndVerifierComputation<E> {
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
        for branch in &mut self.branches {
            branch.reset();
        }
    }

    fn verify(
        &mut self,
        input: &CommonInput<E>,
        first: &SigmaMessage,
        second: &SigmaMessage,
    ) -> Result<bool, ProtocolError> {
        let challenge = self.challenge.take()?;
        let statements = and_statement(input)?;
        check_branch_count(self.branches.len(), statements.len())?;
        let first_messages = first.as_multiple()?;
        let responses = second.as_multiple()?;

        let branch_count = self.branches.len();
        if first_messages.len() != branch_count || responses.len() != branch_count {
            tracing::warn!(
                branch_count,
                first_messages = first_messages.len(),
                responses = responses.len(),
                "AND proof has an unexpected number of components"
            );
            return Ok(false);
        }

        let mut is_valid = true;
        let branch_data = statements.iter().zip(first_messages).zip(responses);
        for (branch, ((statement, first), second)) in self.branches.iter_mut().zip(branch_data) {
            branch.set_challenge(&challenge)?;
            is_valid &= branch.verify(statement, first, second)?;
        }
        Ok(is_valid)
    }
}

/// Simulator for the AND composition of several statements.
pub struct SigmaAndSimulator<E> {
    branches: Vec<Box<dyn SigmaSimulator<E>>>,
    soundness: SoundnessParam,
}

impl<E> std::fmt::Debug for SigmaAndSimulator<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SigmaAndSimulator")
            .field("branches", &self.branches.len())
            .field("soundness", &self.soundness)
            .finish()
    }
}

impl<E> SigmaAndSimulator<E> {
    /// Creates an AND composition of the specified branches.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no branches, or if the branches have
    /// differing soundness parameters.
    pub fn new(branches: Vec<Box<dyn SigmaSimulator<E>>>) -> Result<Self, ConfigError> {
        let soundness = common_soundness(branches.iter().map(|branch| branch.soundness()), 1)?;
        Ok(Self {
            branches,
            soundness,
        })
    }
}

impl<E> SigmaSimulator<E> for SigmaAndSimulator<E> {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn simulate_with_challenge(
        &self,
        input: &CommonInput<E>,
        challenge: &[u8],
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError> {
        check_challenge(self.soundness, challenge)?;
        let statements = and_statement(input)?;
        check_branch_count(self.branches.len(), statements.len())?;

        let mut first_messages = Vec::with_capacity(statements.len());
        let mut responses = Vec::with_capacity(statements.len());
        for (branch, statement) in self.branches.iter().zip(statements) {
            let transcript = branch.simulate_with_challenge(statement, challenge, rng)?;
            first_messages.push(transcript.first);
            responses.push(transcript.second);
        }
        Ok(SimulatedTranscript {
            first: SigmaMessage::Multiple(first_messages),
            challenge: challenge.to_vec(),
            second: SigmaMessage::Multiple(responses),
        })
    }
}
