//! ElGamal commitment protocols, all reduced to [`DlogProver`] or [`DhTupleProver`].

use super::{
    adapter::{Adapted, InputConversion},
    DhTupleProver, DhTupleSimulator, DhTupleVerifier, DlogProver, DlogSimulator, DlogVerifier,
};
use crate::{
    config::SoundnessParam,
    errors::ConfigError,
    group::DlogGroup,
    input::{CommonInput, ElGamalWitnessKind},
};

/// Converts an ElGamal public key `h` into the Dlog statement `h = g^w`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElGamalKnowledgeConversion;

impl<E: Clone> InputConversion<E> for ElGamalKnowledgeConversion {
    fn convert_common(&self, input: &CommonInput<E>) -> Result<CommonInput<E>, ConfigError> {
        match input {
            CommonInput::ElGamalCommitmentKnowledge { public_key } => Ok(CommonInput::Dlog {
                h: public_key.clone(),
            }),
            other => Err(other.mismatch("ElGamal commitment knowledge")),
        }
    }
}

/// Converts a statement about a ciphertext `(c1, c2)` with a public plaintext `x`
/// into a DH tuple statement.
///
/// - If the prover knows the randomness `r`, the tuple is `(g, h, c1, c2 / x)`.
/// - If the prover knows the private key `w`, the tuple is `(g, c1, h, c2 / x)`.
#[derive(Debug, Clone)]
pub struct ElGamalValueConversion<G> {
    group: G,
}

impl<G: DlogGroup> ElGamalValueConversion<G> {
    fn dh_tuple(
        &self,
        public_key: &G::Element,
        c1: &G::Element,
        c2: &G::Element,
        value: &G::Element,
        witness: ElGamalWitnessKind,
    ) -> CommonInput<G::Element> {
        let unblinded = self.group.multiply(c2, &self.group.invert(value));
        let (h, u) = match witness {
            ElGamalWitnessKind::Randomness => (public_key.clone(), c1.clone()),
            ElGamalWitnessKind::PrivateKey => (c1.clone(), public_key.clone()),
        };
        CommonInput::DhTuple { h, u, v: unblinded }
    }
}

impl<G: DlogGroup> InputConversion<G::Element> for ElGamalValueConversion<G> {
    fn convert_common(
        &self,
        input: &CommonInput<G::Element>,
    ) -> Result<CommonInput<G::Element>, ConfigError> {
        match input {
            CommonInput::ElGamalCommittedValue {
                public_key,
                c1,
                c2,
                value,
            } => Ok(self.dh_tuple(public_key, c1, c2, value, ElGamalWitnessKind::Randomness)),
            CommonInput::ElGamalEncryptedValue {
                public_key,
                c1,
                c2,
                value,
                witness,
            } => Ok(self.dh_tuple(public_key, c1, c2, value, *witness)),
            other => Err(other.mismatch("ElGamal committed or encrypted value")),
        }
    }
}

/// Prover for the knowledge of an ElGamal private key. The witness is the private key
/// (see [`SecretKey::to_witness()`](crate::SecretKey::to_witness())).
pub type ElGamalCommitmentKnowledgeProver<G> = Adapted<ElGamalKnowledgeConversion, DlogProver<G>>;
/// Verifier for the knowledge of an ElGamal private key.
pub type ElGamalCommitmentKnowledgeVerifier<G> =
    Adapted<ElGamalKnowledgeConversion, DlogVerifier<G>>;
/// Simulator for the knowledge of an ElGamal private key.
pub type ElGamalCommitmentKnowledgeSimulator<G> =
    Adapted<ElGamalKnowledgeConversion, DlogSimulator<G>>;

/// Prover for the statement that an ElGamal commitment hides a certain value.
/// The witness is the commitment randomness.
pub type ElGamalCommittedValueProver<G> = Adapted<ElGamalValueConversion<G>, DhTupleProver<G>>;
/// Verifier for the statement that an ElGamal commitment hides a certain value.
pub type ElGamalCommittedValueVerifier<G> = Adapted<ElGamalValueConversion<G>, DhTupleVerifier<G>>;
/// Simulator for the statement that an ElGamal commitment hides a certain value.
pub type ElGamalCommittedValueSimulator<G> =
    Adapted<ElGamalValueConversion<G>, DhTupleSimulator<G>>;

/// Prover for the statement that an ElGamal ciphertext encrypts a certain value.
/// Depending on [`ElGamalWitnessKind`] in the statement, the witness is either
/// the encryption randomness or the receiver's private key.
///
/// This type is structurally the same as [`ElGamalCommittedValueProver`], but
/// it is expected to be used with [`CommonInput::ElGamalEncryptedValue`] statements.
pub type ElGamalEncryptedValueProver<G> = ElGamalCommittedValueProver<G>;
/// Verifier for the statement that an ElGamal ciphertext encrypts a certain value.
pub type ElGamalEncryptedValueVerifier<G> = ElGamalCommittedValueVerifier<G>;
/// Simulator for the statement that an ElGamal ciphertext encrypts a certain value.
pub type ElGamalEncryptedValueSimulator<G> = ElGamalCommittedValueSimulator<G>;

macro_rules! impl_constructor {
    ($ty:ident, $inner:ident, $conversion:expr, $doc:literal) => {
        impl<G: DlogGroup + Clone> $ty<G> {
            #[doc = $doc]
            ///
            /// # Errors
            ///
            /// Returns an error if the group is invalid or if `2^t >= q`.
            #[allow(clippy::redundant_closure_call)]
            pub fn new(group: G, soundness: SoundnessParam) -> Result<Self, ConfigError> {
                let inner = $inner::new(group.clone(), soundness)?;
                Ok(Self::from_parts(($conversion)(group), inner))
            }
        }
    };
}

impl_constructor!(
    ElGamalCommitmentKnowledgeProver,
    DlogProver,
    |_| ElGamalKnowledgeConversion,
    "Creates a prover."
);
impl_constructor!(
    ElGamalCommitmentKnowledgeVerifier,
    DlogVerifier,
    |_| ElGamalKnowledgeConversion,
    "Creates a verifier."
);
impl_constructor!(
    ElGamalCommitmentKnowledgeSimulator,
    DlogSimulator,
    |_| ElGamalKnowledgeConversion,
    "Creates a simulator."
);
impl_constructor!(
    ElGamalCommittedValueProver,
    DhTupleProver,
    |group| ElGamalValueConversion { group },
    "Creates a prover."
);
impl_constructor!(
    ElGamalCommittedValueVerifier,
    DhTupleVerifier,
    |group| ElGamalValueConversion { group },
    "Creates a verifier."
);
impl_constructor!(
    ElGamalCommittedValueSimulator,
    DhTupleSimulator,
    |group| ElGamalValueConversion { group },
    "Creates a simulator."
);

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use rand::thread_rng;

    use super::*;
    use crate::{
        encryption::Ciphertext,
        group::ZpGroup,
        input::{ProverInput, Witness},
        keys::Keypair,
        traits::{SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation},
    };

    fn toy_group() -> ZpGroup {
        ZpGroup::new_unchecked(2039_u32.into(), 1019_u32.into(), 4_u32.into())
    }

    #[test]
    fn knowledge_of_private_key() {
        let mut rng = thread_rng();
        let group = toy_group();
        let soundness = SoundnessParam::new(8).unwrap();
        let mut prover = ElGamalCommitmentKnowledgeProver::new(group.clone(), soundness).unwrap();
        let mut verifier =
            ElGamalCommitmentKnowledgeVerifier::new(group.clone(), soundness).unwrap();

        let keypair = Keypair::generate(&group, &mut rng);
        let common = CommonInput::ElGamalCommitmentKnowledge {
            public_key: keypair.public().as_element().clone(),
        };
        let input = ProverInput::new(common.clone(), keypair.secret().to_witness());
        let first = prover.compute_first_message(&input, &mut rng).unwrap();
        let challenge = verifier.sample_challenge(&mut rng);
        let second = prover.compute_second_message(&challenge).unwrap();
        assert!(verifier.verify(&common, &first, &second).unwrap());
    }

    #[test]
    fn committed_value_conversion() {
        let mut rng = thread_rng();
        let group = toy_group();
        let keypair = Keypair::generate(&group, &mut rng);
        let value = group.exponentiate_generator(&BigUint::from(10_u32));
        let (ciphertext, _) = Ciphertext::new(&group, &value, keypair.public(), &mut rng);

        let conversion = ElGamalValueConversion {
            group: group.clone(),
        };
        let common = ciphertext.committed_value_statement(keypair.public(), value.clone());
        let CommonInput::DhTuple { h, u, v } = conversion.convert_common(&common).unwrap() else {
            panic!("unexpected conversion output");
        };
        assert_eq!(h, *keypair.public().as_element());
        assert_eq!(u, *ciphertext.random_element());
        assert_eq!(
            group.multiply(&v, &value),
            *ciphertext.blinded_element()
        );

        let common = ciphertext.encrypted_value_statement(
            keypair.public(),
            value,
            ElGamalWitnessKind::PrivateKey,
        );
        let CommonInput::DhTuple { h, u, .. } = conversion.convert_common(&common).unwrap() else {
            panic!("unexpected conversion output");
        };
        assert_eq!(h, *ciphertext.random_element());
        assert_eq!(u, *keypair.public().as_element());
    }

    #[test]
    fn encrypted_value_with_either_witness() {
        let mut rng = thread_rng();
        let group = toy_group();
        let soundness = SoundnessParam::new(8).unwrap();
        let mut prover = ElGamalEncryptedValueProver::new(group.clone(), soundness).unwrap();
        let mut verifier = ElGamalEncryptedValueVerifier::new(group.clone(), soundness).unwrap();

        let keypair = Keypair::generate(&group, &mut rng);
        let value = group.exponentiate_generator(&BigUint::from(321_u32));
        let (ciphertext, randomness) = Ciphertext::new(&group, &value, keypair.public(), &mut rng);

        let inputs = [
            (ElGamalWitnessKind::Randomness, Witness::Exponent(randomness)),
            (ElGamalWitnessKind::PrivateKey, keypair.secret().to_witness()),
        ];
        for (kind, witness) in inputs {
            let common =
                ciphertext.encrypted_value_statement(keypair.public(), value.clone(), kind);
            let input = ProverInput::new(common.clone(), witness);
            let first = prover.compute_first_message(&input, &mut rng).unwrap();
            let challenge = verifier.sample_challenge(&mut rng);
            let second = prover.compute_second_message(&challenge).unwrap();
            assert!(verifier.verify(&common, &first, &second).unwrap());
        }

        let other_value = group.exponentiate_generator(&BigUint::from(322_u32));
        let common = ciphertext.encrypted_value_statement(
            keypair.public(),
            other_value,
            ElGamalWitnessKind::PrivateKey,
        );
        let simulator = ElGamalEncryptedValueSimulator::new(group, soundness).unwrap();
        let transcript = simulator.simulate(&common, &mut rng).unwrap();
        verifier.set_challenge(&transcript.challenge).unwrap();
        assert!(verifier
            .verify(&common, &transcript.first, &transcript.second)
            .unwrap());
    }
}
