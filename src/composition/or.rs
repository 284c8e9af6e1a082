//! OR composition.

use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;

use super::{check_branch_count, common_soundness};
use crate::{
    challenge::{random_challenge, xor_into},
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

fn or_statement<E>(input: &CommonInput<E>) -> Result<&[CommonInput<E>], ConfigError> {
    match input {
        CommonInput::Or(statements) => Ok(statements),
        other => Err(other.mismatch("OR composition")),
    }
}

/// Simulated branches of an unfinished proof.
#[derive(Debug)]
struct OrState {
    real_index: usize,
    /// Challenges for all branches; the real branch has an empty placeholder.
    challenges: Vec<Vec<u8>>,
    /// Second messages for all branches; `None` for the real branch.
    responses: Vec<Option<SigmaMessage>>,
}

/// Prover computation for the OR composition of several statements.
///
/// The prover input must be created with [`ProverInput::or()`] (or an equivalent);
/// it contains a witness for exactly one of the statements. The first message is
/// [`SigmaMessage::Multiple`] with first messages of all branches, and the second message
/// is [`SigmaMessage::Or`].
///
/// # Examples
///
/// ```
/// # use elastic_sigma::{
/// #     composition::{SigmaOrProverComputation, SigmaOrVerifierComputation},
/// #     group::{DlogGroup, Ristretto}, protocols::{DlogProver, DlogVerifier},
/// #     CommonInput, OrBranch, ProverInput, SigmaProverComputation,
/// #     SigmaVerifierComputation, SoundnessParam, Witness,
/// # };
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut rng = rand::thread_rng();
/// let group = Ristretto::default();
/// let soundness = SoundnessParam::DEFAULT;
/// let mut prover = SigmaOrProverComputation::two(
///     Box::new(DlogProver::new(group.clone(), soundness)?),
///     Box::new(DlogProver::new(group.clone(), soundness)?),
/// )?;
/// let mut verifier = SigmaOrVerifierComputation::two(
///     Box::new(DlogVerifier::new(group.clone(), soundness)?),
///     Box::new(DlogVerifier::new(group.clone(), soundness)?),
/// )?;
///
/// // We know the discrete log of the second element only.
/// let w = group.random_exponent(&mut rng);
/// let input = ProverInput::or(vec![
///     OrBranch::Simulated(CommonInput::Dlog {
///         h: group.exponentiate_generator(&group.random_exponent(&mut rng)),
///     }),
///     OrBranch::Real(ProverInput::new(
///         CommonInput::Dlog { h: group.exponentiate_generator(&w) },
///         Witness::exponent(w),
///     )),
/// ])?;
///
/// let first = prover.compute_first_message(&input, &mut rng)?;
/// let challenge = verifier.sample_challenge(&mut rng);
/// let second = prover.compute_second_message(&challenge)?;
/// assert!(verifier.verify(input.common(), &first, &second)?);
/// # Ok(())
/// # }
/// ```
pub struct SigmaOrProverComputation<E> {
    branches: Vec<Box<dyn SigmaProverComputation<E>>>,
    soundness: SoundnessParam,
    state: Option<OrState>,
}

impl<E> std::fmt::Debug for SigmaOrProverComputation<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SigmaOrProverComputation")
            .field("branches", &self.branches.len())
            .field("soundness", &self.soundness)
            .field("state", &self.state)
            .finish()
    }
}

impl<E> SigmaOrProverComputation<E> {
    /// Creates an OR composition of the specified branches.
    ///
    /// # Errors
    ///
    /// Returns an error if there are less than 2 branches, or if the branches have
    /// differing soundness parameters.
    pub fn new(branches: Vec<Box<dyn SigmaProverComputation<E>>>) -> Result<Self, ConfigError> {
        let soundness = common_soundness(branches.iter().map(|branch| branch.soundness()), 2)?;
        Ok(Self {
            branches,
            soundness,
            state: None,
        })
    }

    /// Creates an OR composition of two branches.
    ///
    /// # Errors
    ///
    /// Returns an error if the branches have differing soundness parameters.
    pub fn two(
        first: Box<dyn SigmaProverComputation<E>>,
        second: Box<dyn SigmaProverComputation<E>>,
    ) -> Result<Self, ConfigError> {
        Self::new(vec![first, second])
    }

    /// Returns the number of branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Always returns `false`; compositions have at least 2 branches.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn erase(&mut self) {
        self.state = None;
        for branch in &mut self.branches {
            branch.reset();
        }
    }
}

impl<E: 'static> SigmaProverComputation<E> for SigmaOrProverComputation<E>
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
        let statements = or_statement(input.common())?;
        check_branch_count(self.branches.len(), statements.len())?;
        let Witness::Or {
            index: real_index,
            witness,
        } = input.witness()
        else {
            return Err(input.witness().mismatch("OR witness").into());
        };
        let real_index = *real_index;
        if real_index >= statements.len() {
            return Err(ConfigError::InvalidInput("OR witness index is out of bounds").into());
        }

        let mut first_messages = Vec::with_capacity(statements.len());
        let mut challenges = Vec::with_capacity(statements.len());
        let mut responses = Vec::with_capacity(statements.len());
        for (i, (branch, statement)) in self.branches.iter().zip(statements).enumerate() {
            if i == real_index {
                first_messages.push(None);
                challenges.push(vec![]);
                responses.push(None);
            } else {
                let transcript = branch.simulator().simulate(statement, rng)?;
                first_messages.push(Some(transcript.first));
                challenges.push(transcript.challenge);
                responses.push(Some(transcript.second));
            }
        }

        let real_input = ProverInput::new(statements[real_index].clone(), (**witness).clone());
        let real_first = self.branches[real_index].compute_first_message(&real_input, rng)?;
        first_messages[real_index] = Some(real_first);
        tracing::trace!(
            branches = statements.len(),
            "simulated all OR branches except the real one"
        );

        self.state = Some(OrState {
            real_index,
            challenges,
            responses,
        });
        Ok(SigmaMessage::Multiple(
            first_messages.into_iter().flatten().collect(),
        ))
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        let mut state = self.state.take().ok_or_else(no_first_message)?;
        if let Err(err) = check_challenge(self.soundness, challenge) {
            self.branches[state.real_index].reset();
            return Err(err);
        }

        let mut real_challenge = challenge.to_vec();
        for (i, branch_challenge) in state.challenges.iter().enumerate() {
            if i != state.real_index {
                xor_into(&mut real_challenge, branch_challenge);
            }
        }
        let real_response =
            self.branches[state.real_index].compute_second_message(&real_challenge)?;
        state.challenges[state.real_index] = real_challenge;
        state.responses[state.real_index] = Some(real_response);

        Ok(SigmaMessage::Or {
            challenges: state.challenges,
            responses: state.responses.into_iter().flatten().collect(),
        })
    }

    fn has_pending_state(&self) -> bool {
        self.state.is_some() || self.branches.iter().any(|branch| branch.has_pending_state())
    }

    fn reset(&mut self) {
        self.erase();
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<E>> {
        Box::new(SigmaOrSimulator {
            branches: self.branches.iter().map(|branch| branch.simulator()).collect(),
            soundness: self.soundness,
        })
    }
}

/// Verifier computation for the OR composition of several statements.
pub struct SigmaOrVerifierComputation<E> {
    branches: Vec<Box<dyn SigmaVerifierComputation<E>>>,
    challenge: ChallengeSlot,
}

impl<E> std::fmt::Debug for SigmaOrVerifierComputation<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SigmaOrVerifierComputation")
            .field("branches", &self.branches.len())
            .field("challenge", &self.challenge)
            .finish()
    }
}

impl<E> SigmaOrVerifierComputation<E> {
    /// Creates an OR composition of the specified branches.
    ///
    /// # Errors
    ///
    /// Returns an error if there are less than 2 branches, or if the branches have
    /// differing soundness parameters.
    pub fn new(
        branches: Vec<Box<dyn SigmaVerifierComputation<E>>>,
    ) -> Result<Self, ConfigError> {
        let soundness = common_soundness(branches.iter().map(|branch| branch.soundness()), 2)?;
        Ok(Self {
            branches,
            challenge: ChallengeSlot::new(soundness),
        })
    }

    /// Creates an OR composition of two branches.
    ///
    /// # Errors
    ///
    /// Returns an error if the branches have differing soundness parameters.
    pub fn two(
        first: Box<dyn SigmaVerifierComputation<E>>,
        second: Box<dyn SigmaVerifierComputation<E>>,
    ) -> Result<Self, ConfigError> {
        Self::new(vec![first, second])
    }
}

impl<E> SigmaVerifierComputation<E> for SigmaOrVerifierComputation<E> {
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
        let statements = or_statement(input)?;
        check_branch_count(self.branches.len(), statements.len())?;
        let first_messages = first.as_multiple()?;
        let (challenges, responses) = second.as_or()?;

        let branch_count = self.branches.len();
        if first_messages.len() != branch_count
            || challenges.len() != branch_count
            || responses.len() != branch_count
        {
            tracing::warn!(
                branch_count,
                first_messages = first_messages.len(),
                challenges = challenges.len(),
                responses = responses.len(),
                "OR proof has an unexpected number of components"
            );
            return Ok(false);
        }
        let expected_len = challenge.len();
        if let Some(index) = challenges.iter().position(|e| e.len() != expected_len) {
            tracing::warn!(index, "OR proof contains a branch challenge of wrong length");
            return Ok(false);
        }

        let mut combined_challenge = vec![0_u8; expected_len];
        for branch_challenge in challenges {
            xor_into(&mut combined_challenge, branch_challenge);
        }
        let xor_holds = bool::from(combined_challenge.ct_eq(&challenge));
        if !xor_holds {
            tracing::warn!("branch challenges of an OR proof do not XOR to the challenge");
        }

        let mut branches_hold = true;
        let branch_data = statements
            .iter()
            .zip(first_messages)
            .zip(challenges.iter().zip(responses));
        for (branch, ((statement, first), (branch_challenge, second))) in
            self.branches.iter_mut().zip(branch_data)
        {
            branch.set_challenge(branch_challenge)?;
            branches_hold &= branch.verify(statement, first, second)?;
        }
        Ok(xor_holds & branches_hold)
    }
}

/// Simulator for the OR composition of several statements.
pub struct SigmaOrSimulator<E> {
    branches: Vec<Box<dyn SigmaSimulator<E>>>,
    soundness: SoundnessParam,
}

impl<E> std::fmt::Debug for SigmaOrSimulator<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SigmaOrSimulator")
            .field("branches", &self.branches.len())
            .field("soundness", &self.soundness)
            .finish()
    }
}

impl<E> SigmaOrSimulator<E> {
    /// Creates an OR composition of the specified branches.
    ///
    /// # Errors
    ///
    /// Returns an error if there are less than 2 branches, or if the branches have
    /// differing soundness parameters.
    pub fn new(branches: Vec<Box<dyn SigmaSimulator<E>>>) -> Result<Self, ConfigError> {
        let soundness = common_soundness(branches.iter().map(|branch| branch.soundness()), 2)?;
        Ok(Self {
            branches,
            soundness,
        })
    }
}

impl<E> SigmaSimulator<E> for SigmaOrSimulator<E> {
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
        let statements = or_statement(input)?;
        check_branch_count(self.branches.len(), statements.len())?;

        // The first branch gets the challenge fixed by all other ones.
        let mut challenges: Vec<_> = (0..statements.len())
            .map(|_| random_challenge(self.soundness, rng))
            .collect();
        let mut first_challenge = challenge.to_vec();
        for branch_challenge in &challenges[1..] {
            xor_into(&mut first_challenge, branch_challenge);
        }
        challenges[0] = first_challenge;

        let mut first_messages = Vec::with_capacity(statements.len());
        let mut responses = Vec::with_capacity(statements.len());
        for ((branch, statement), branch_challenge) in
            self.branches.iter().zip(statements).zip(&challenges)
        {
            let transcript = branch.simulate_with_challenge(statement, branch_challenge, rng)?;
            first_messages.push(transcript.first);
            responses.push(transcript.second);
        }

        Ok(SimulatedTranscript {
            first: SigmaMessage::Multiple(first_messages),
            challenge: challenge.to_vec(),
            second: SigmaMessage::Or {
                challenges,
                responses,
            },
        })
    }
}
