//! Tests for AND / OR compositions.

use rand_chacha::ChaChaRng;

use std::collections::BTreeMap;

use crate::{run_protocol, seeded_rng};
use elastic_sigma::{
    composition::{
        SigmaAndProverComputation, SigmaAndVerifierComputation, SigmaOrProverComputation,
        SigmaOrSimulator, SigmaOrVerifierComputation,
    },
    group::{DlogGroup, ZpGroup},
    protocols::{
        DhTupleProver, DhTupleVerifier, DlogProver, DlogSimulator, DlogVerifier,
        ElGamalCommitmentKnowledgeProver, ElGamalCommitmentKnowledgeVerifier,
    },
    CommonInput, ConfigError, Keypair, OrBranch, ProverInput, SigmaMessage,
    SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation, SoundnessParam, Witness,
};

type Prover<E> = Box<dyn SigmaProverComputation<E>>;
type Verifier<E> = Box<dyn SigmaVerifierComputation<E>>;

fn dlog_statement<G: DlogGroup>(group: &G, rng: &mut ChaChaRng) -> ProverInput<G::Element> {
    let w = group.random_exponent(rng);
    let common = CommonInput::Dlog {
        h: group.exponentiate_generator(&w),
    };
    ProverInput::new(common, Witness::exponent(w))
}

fn dlog_provers<G>(group: &G, count: usize) -> Vec<Prover<G::Element>>
where
    G: DlogGroup + Clone + 'static,
{
    (0..count)
        .map(|_| {
            let prover = DlogProver::new(group.clone(), SoundnessParam::DEFAULT).unwrap();
            Box::new(prover) as Prover<G::Element>
        })
        .collect()
}

fn dlog_verifiers<G>(group: &G, count: usize) -> Vec<Verifier<G::Element>>
where
    G: DlogGroup + Clone + 'static,
{
    (0..count)
        .map(|_| {
            let verifier = DlogVerifier::new(group.clone(), SoundnessParam::DEFAULT).unwrap();
            Box::new(verifier) as Verifier<G::Element>
        })
        .collect()
}

fn or_input<G: DlogGroup>(
    group: &G,
    count: usize,
    real_index: usize,
    rng: &mut ChaChaRng,
) -> ProverInput<G::Element> {
    let branches = (0..count)
        .map(|i| {
            let input = dlog_statement(group, rng);
            if i == real_index {
                OrBranch::Real(input)
            } else {
                OrBranch::Simulated(input.common().clone())
            }
        })
        .collect();
    ProverInput::or(branches).unwrap()
}

fn test_n_way_or<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(10);
    for count in [2, 4, 7] {
        let mut prover = SigmaOrProverComputation::new(dlog_provers(&group, count)).unwrap();
        let mut verifier = SigmaOrVerifierComputation::new(dlog_verifiers(&group, count)).unwrap();
        for real_index in [0, count / 2, count - 1] {
            let input = or_input(&group, count, real_index, &mut rng);
            assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));
        }
    }
}

fn test_or_with_tampered_challenge<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(11);
    let mut prover = SigmaOrProverComputation::new(dlog_provers(&group, 3)).unwrap();
    let mut verifier = SigmaOrVerifierComputation::new(dlog_verifiers(&group, 3)).unwrap();
    let input = or_input(&group, 3, 2, &mut rng);

    let first = prover.compute_first_message(&input, &mut rng).unwrap();
    let challenge = verifier.sample_challenge(&mut rng);
    let second = prover.compute_second_message(&challenge).unwrap();

    for tampered_index in 0..3 {
        let SigmaMessage::Or {
            mut challenges,
            responses,
        } = second.clone()
        else {
            panic!("unexpected second message: {second:?}");
        };
        challenges[tampered_index][0] ^= 0x80;
        let tampered = SigmaMessage::Or {
            challenges,
            responses,
        };
        verifier.set_challenge(&challenge).unwrap();
        assert!(!verifier.verify(input.common(), &first, &tampered).unwrap());
    }

    verifier.set_challenge(&challenge).unwrap();
    assert!(verifier.verify(input.common(), &first, &second).unwrap());
}

fn test_or_simulator<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(12);
    let simulators: Vec<Box<dyn SigmaSimulator<G::Element>>> = (0..3)
        .map(|_| {
            let simulator = DlogSimulator::new(group.clone(), SoundnessParam::DEFAULT).unwrap();
            Box::new(simulator) as Box<dyn SigmaSimulator<G::Element>>
        })
        .collect();
    let simulator = SigmaOrSimulator::new(simulators).unwrap();
    let mut verifier = SigmaOrVerifierComputation::new(dlog_verifiers(&group, 3)).unwrap();

    // No witnesses at all.
    let statements = (0..3)
        .map(|_| dlog_statement(&group, &mut rng).common().clone())
        .collect();
    let common = CommonInput::Or(statements);
    let transcript = simulator.simulate(&common, &mut rng).unwrap();
    verifier.set_challenge(&transcript.challenge).unwrap();
    assert!(verifier
        .verify(&common, &transcript.first, &transcript.second)
        .unwrap());
}

fn test_mixed_composition<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(13);
    let soundness = SoundnessParam::DEFAULT;

    // (know private key) AND (know dlog of h1 OR know DH tuple witness)
    let or_prover = SigmaOrProverComputation::two(
        Box::new(DlogProver::new(group.clone(), soundness).unwrap()),
        Box::new(DhTupleProver::new(group.clone(), soundness).unwrap()),
    )
    .unwrap();
    let or_verifier = SigmaOrVerifierComputation::two(
        Box::new(DlogVerifier::new(group.clone(), soundness).unwrap()),
        Box::new(DhTupleVerifier::new(group.clone(), soundness).unwrap()),
    )
    .unwrap();
    let key_prover = ElGamalCommitmentKnowledgeProver::new(group.clone(), soundness).unwrap();
    let mut prover = SigmaAndProverComputation::new(vec![
        Box::new(key_prover) as Prover<G::Element>,
        Box::new(or_prover),
    ])
    .unwrap();
    let key_verifier =
        ElGamalCommitmentKnowledgeVerifier::new(group.clone(), soundness).unwrap();
    let mut verifier = SigmaAndVerifierComputation::new(vec![
        Box::new(key_verifier) as Verifier<G::Element>,
        Box::new(or_verifier),
    ])
    .unwrap();

    let keypair = Keypair::generate(&group, &mut rng);
    let key_input = ProverInput::new(
        CommonInput::ElGamalCommitmentKnowledge {
            public_key: keypair.public().as_element().clone(),
        },
        keypair.secret().to_witness(),
    );

    let w = group.random_exponent(&mut rng);
    let h = group.exponentiate_generator(&group.random_exponent(&mut rng));
    let dh_input = ProverInput::new(
        CommonInput::DhTuple {
            u: group.exponentiate_generator(&w),
            v: group.exponentiate(&h, &w),
            h,
        },
        Witness::exponent(w),
    );
    let dlog_common = dlog_statement(&group, &mut rng).common().clone();
    let mut branches = BTreeMap::new();
    branches.insert(1, OrBranch::Real(dh_input));
    branches.insert(0, OrBranch::Simulated(dlog_common));
    let or_input = ProverInput::or_from_map(branches).unwrap();

    let input = ProverInput::and(vec![key_input, or_input]);
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));

    let transcript = prover.simulator().simulate(input.common(), &mut rng).unwrap();
    verifier.set_challenge(&transcript.challenge).unwrap();
    assert!(verifier
        .verify(input.common(), &transcript.first, &transcript.second)
        .unwrap());
}

#[test]
fn soundness_mismatch_is_a_config_error() {
    let group = ZpGroup::rfc3526_2048();
    let provers: Vec<Prover<_>> = vec![
        Box::new(DlogProver::new(group.clone(), SoundnessParam::DEFAULT).unwrap()),
        Box::new(DlogProver::new(group.clone(), SoundnessParam::DEFAULT).unwrap()),
        Box::new(DlogProver::new(group, SoundnessParam::new(128).unwrap()).unwrap()),
    ];
    let err = SigmaOrProverComputation::new(provers).unwrap_err();
    assert!(
        matches!(
            err,
            ConfigError::SoundnessMismatch {
                index: 2,
                expected: 80,
                actual: 128,
            }
        ),
        "{err}"
    );
}

#[test]
fn or_input_without_real_witness_is_rejected() {
    let mut rng = seeded_rng(14);
    let group = ZpGroup::rfc3526_2048();
    let branches = (0..3)
        .map(|_| OrBranch::Simulated(dlog_statement(&group, &mut rng).common().clone()))
        .collect();
    let err = ProverInput::or(branches).unwrap_err();
    assert!(matches!(err, ConfigError::WitnessCount(0)), "{err}");
}

mod zp {
    use super::*;

    #[test]
    fn n_way_or() {
        test_n_way_or(ZpGroup::rfc3526_2048());
    }

    #[test]
    fn or_with_tampered_challenge() {
        test_or_with_tampered_challenge(ZpGroup::rfc3526_2048());
    }

    #[test]
    fn or_simulator() {
        test_or_simulator(ZpGroup::rfc3526_2048());
    }

    #[test]
    fn mixed_composition() {
        test_mixed_composition(ZpGroup::rfc3526_2048());
    }
}

#[cfg(feature = "curve25519-dalek")]
mod ristretto {
    use super::*;
    use elastic_sigma::group::Ristretto;

    #[test]
    fn n_way_or() {
        test_n_way_or(Ristretto::default());
    }

    #[test]
    fn or_with_tampered_challenge() {
        test_or_with_tampered_challenge(Ristretto::default());
    }

    #[test]
    fn or_simulator() {
        test_or_simulator(Ristretto::default());
    }

    #[test]
    fn mixed_composition() {
        test_mixed_composition(Ristretto::default());
    }
}

#[cfg(feature = "elliptic-curve")]
mod k256 {
    use super::*;
    use elastic_sigma::group::Generic;

    type K256 = Generic<::k256::Secp256k1>;

    #[test]
    fn n_way_or() {
        test_n_way_or(K256::default());
    }

    #[test]
    fn mixed_composition() {
        test_mixed_composition(K256::default());
    }
}
