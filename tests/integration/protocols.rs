//! Tests for individual protocols across group backends.

use num_bigint::BigUint;
use rand_chacha::ChaChaRng;

use crate::{dj_key, run_protocol, seeded_rng};
use elastic_sigma::{
    group::{DlogGroup, ZpGroup},
    protocols::{
        DhExtendedProver, DhExtendedVerifier, DhTupleProver, DhTupleSimulator, DhTupleVerifier,
        DjEncryptedValueProver, DjEncryptedValueVerifier, DjEncryptedZeroProver,
        DjEncryptedZeroVerifier, DjProductProver, DjProductSimulator, DjProductVerifier,
        DlogProver, DlogSimulator, DlogVerifier, ElGamalCommitmentKnowledgeProver,
        ElGamalCommitmentKnowledgeVerifier, ElGamalCommittedValueProver,
        ElGamalCommittedValueVerifier, ElGamalEncryptedValueProver, ElGamalEncryptedValueVerifier,
        PedersenCommittedValueProver, PedersenCommittedValueVerifier, PedersenProver,
        PedersenVerifier,
    },
    Ciphertext, CommonInput, ConfigError, ElGamalWitnessKind, Keypair, PedersenCommitment,
    ProtocolError, ProverInput, SigmaProverComputation, SigmaSimulator,
    SigmaVerifierComputation, SoundnessParam, Witness,
};

fn dlog_input<G: DlogGroup>(group: &G, rng: &mut ChaChaRng) -> ProverInput<G::Element> {
    let w = group.random_exponent(rng);
    let common = CommonInput::Dlog {
        h: group.exponentiate_generator(&w),
    };
    ProverInput::new(common, Witness::exponent(w))
}

fn dh_tuple_input<G: DlogGroup>(group: &G, rng: &mut ChaChaRng) -> ProverInput<G::Element> {
    let w = group.random_exponent(rng);
    let h = group.exponentiate_generator(&group.random_exponent(rng));
    let common = CommonInput::DhTuple {
        u: group.exponentiate_generator(&w),
        v: group.exponentiate(&h, &w),
        h,
    };
    ProverInput::new(common, Witness::exponent(w))
}

fn test_dlog_protocol<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(1);
    let soundness = SoundnessParam::DEFAULT;
    let mut prover = DlogProver::new(group.clone(), soundness).unwrap();
    let mut verifier = DlogVerifier::new(group.clone(), soundness).unwrap();
    for _ in 0..5 {
        let input = dlog_input(&group, &mut rng);
        assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));
    }

    // A proof for one statement does not verify for another one.
    let input = dlog_input(&group, &mut rng);
    let other_input = dlog_input(&group, &mut rng);
    let first = prover.compute_first_message(&input, &mut rng).unwrap();
    let challenge = verifier.sample_challenge(&mut rng);
    let second = prover.compute_second_message(&challenge).unwrap();
    assert!(!verifier.verify(other_input.common(), &first, &second).unwrap());

    let simulator = DlogSimulator::new(group, soundness).unwrap();
    let transcript = simulator.simulate(other_input.common(), &mut rng).unwrap();
    verifier.set_challenge(&transcript.challenge).unwrap();
    assert!(verifier
        .verify(other_input.common(), &transcript.first, &transcript.second)
        .unwrap());
}

fn test_dh_protocols<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(2);
    let soundness = SoundnessParam::DEFAULT;
    let mut prover = DhTupleProver::new(group.clone(), soundness).unwrap();
    let mut verifier = DhTupleVerifier::new(group.clone(), soundness).unwrap();
    let input = dh_tuple_input(&group, &mut rng);
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));

    let simulator = DhTupleSimulator::new(group.clone(), soundness).unwrap();
    let challenge = vec![0xa5; soundness.byte_len()];
    let transcript = simulator
        .simulate_with_challenge(input.common(), &challenge, &mut rng)
        .unwrap();
    assert_eq!(transcript.challenge, challenge);
    verifier.set_challenge(&challenge).unwrap();
    assert!(verifier
        .verify(input.common(), &transcript.first, &transcript.second)
        .unwrap());

    let mut prover = DhExtendedProver::new(group.clone(), soundness).unwrap();
    let mut verifier = DhExtendedVerifier::new(group.clone(), soundness).unwrap();
    let w = group.random_exponent(&mut rng);
    let bases: Vec<_> = (0..4)
        .map(|_| group.exponentiate_generator(&group.random_exponent(&mut rng)))
        .collect();
    let powers = bases.iter().map(|base| group.exponentiate(base, &w)).collect();
    let input = ProverInput::new(
        CommonInput::DhExtended { bases, powers },
        Witness::exponent(w),
    );
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));
}

fn test_commitment_protocols<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(3);
    let soundness = SoundnessParam::DEFAULT;

    let key = group.exponentiate_generator(&group.random_exponent(&mut rng));
    let commitment = PedersenCommitment::new(&group, key, &BigUint::from(42_u32), &mut rng);
    let mut prover = PedersenProver::new(group.clone(), soundness).unwrap();
    let mut verifier = PedersenVerifier::new(group.clone(), soundness).unwrap();
    let input = commitment.knowledge_input();
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));

    let mut prover = PedersenCommittedValueProver::new(group.clone(), soundness).unwrap();
    let mut verifier = PedersenCommittedValueVerifier::new(group.clone(), soundness).unwrap();
    let input = commitment.committed_value_input();
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));

    let keypair = Keypair::generate(&group, &mut rng);
    let mut prover = ElGamalCommitmentKnowledgeProver::new(group.clone(), soundness).unwrap();
    let mut verifier = ElGamalCommitmentKnowledgeVerifier::new(group.clone(), soundness).unwrap();
    let common = CommonInput::ElGamalCommitmentKnowledge {
        public_key: keypair.public().as_element().clone(),
    };
    let input = ProverInput::new(common, keypair.secret().to_witness());
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));

    let value = group.exponentiate_generator(&BigUint::from(7_u32));
    let (ciphertext, randomness) = Ciphertext::new(&group, &value, keypair.public(), &mut rng);
    let mut prover = ElGamalCommittedValueProver::new(group.clone(), soundness).unwrap();
    let mut verifier = ElGamalCommittedValueVerifier::new(group.clone(), soundness).unwrap();
    let common = ciphertext.committed_value_statement(keypair.public(), value.clone());
    let input = ProverInput::new(common, Witness::Exponent(randomness.clone()));
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));

    let mut prover = ElGamalEncryptedValueProver::new(group.clone(), soundness).unwrap();
    let mut verifier = ElGamalEncryptedValueVerifier::new(group.clone(), soundness).unwrap();
    let common = ciphertext.encrypted_value_statement(
        keypair.public(),
        value.clone(),
        ElGamalWitnessKind::PrivateKey,
    );
    let input = ProverInput::new(common, keypair.secret().to_witness());
    assert!(run_protocol(&mut prover, &mut verifier, &input, &mut rng));

    // Wrong plaintext.
    let other_value = group.exponentiate_generator(&BigUint::from(8_u32));
    let common = ciphertext.encrypted_value_statement(
        keypair.public(),
        other_value,
        ElGamalWitnessKind::Randomness,
    );
    let input = ProverInput::new(common, Witness::Exponent(randomness));
    assert!(!run_protocol(&mut prover, &mut verifier, &input, &mut rng));
}

fn test_challenge_length_is_enforced<G: DlogGroup + Clone + 'static>(group: G) {
    let mut rng = seeded_rng(4);
    let soundness = SoundnessParam::DEFAULT;
    let mut prover = DlogProver::new(group.clone(), soundness).unwrap();
    let input = dlog_input(&group, &mut rng);

    for len in [soundness.byte_len() - 1, soundness.byte_len() + 1] {
        prover.compute_first_message(&input, &mut rng).unwrap();
        let err = prover.compute_second_message(&vec![0; len]).unwrap_err();
        assert!(err.is_cheat_attempt(), "{err:?}");
        assert!(!prover.has_pending_state());
    }

    let mut verifier = DlogVerifier::new(group, soundness).unwrap();
    assert!(verifier.set_challenge(&[0; 3]).is_err());
    assert!(verifier.challenge().is_none());
}

mod zp {
    use super::*;

    #[test]
    fn dlog_protocol() {
        test_dlog_protocol(ZpGroup::rfc3526_2048());
    }

    #[test]
    fn dh_protocols() {
        test_dh_protocols(ZpGroup::rfc3526_2048());
    }

    #[test]
    fn commitment_protocols() {
        test_commitment_protocols(ZpGroup::rfc3526_2048());
    }

    #[test]
    fn challenge_length_is_enforced() {
        test_challenge_length_is_enforced(ZpGroup::rfc3526_2048());
    }

    #[test]
    fn soundness_parameter_boundary() {
        // 1019 = 2 * 509 + 1 is a safe prime; 2^8 < 509 < 2^16.
        let group = ZpGroup::new(1019_u32.into(), 509_u32.into(), 4_u32.into()).unwrap();
        DlogProver::new(group.clone(), SoundnessParam::new(8).unwrap()).unwrap();
        let err = DlogProver::new(group.clone(), SoundnessParam::new(16).unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::SoundnessTooLarge { .. }), "{err:?}");
        let err = DhTupleVerifier::new(group, SoundnessParam::new(16).unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::SoundnessTooLarge { .. }), "{err:?}");
    }

    #[test]
    fn invalid_group_is_rejected() {
        // 2039 is a safe prime, but 7 does not generate the order-1019 subgroup.
        let group = ZpGroup::new_unchecked(2039_u32.into(), 1019_u32.into(), 7_u32.into());
        let err = DlogVerifier::new(group, SoundnessParam::new(8).unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGroup(_)), "{err:?}");
    }

    #[test]
    fn toy_dlog_transcript() {
        // Exponents live in Z_22; 2^8 >= 22, so no computation can be constructed for t = 8.
        let group = ZpGroup::new_unchecked(23_u32.into(), 22_u32.into(), 5_u32.into());
        let err = DlogProver::new(group.clone(), SoundnessParam::new(8).unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::SoundnessTooLarge { .. }), "{err:?}");

        let h = group.exponentiate_generator(&6_u32.into());
        assert_eq!(h, BigUint::from(8_u32));
        let a = group.exponentiate_generator(&3_u32.into());
        assert_eq!(a, BigUint::from(10_u32));
        let e = BigUint::from(0x02_u8);
        let z = (BigUint::from(3_u32) + &e * 6_u32) % 22_u32;
        assert_eq!(z, BigUint::from(15_u32));

        let lhs = group.exponentiate_generator(&z);
        let rhs = group.multiply(&a, &group.exponentiate(&h, &e));
        assert_eq!(lhs, BigUint::from(19_u32));
        assert_eq!(lhs, rhs);
    }
}

#[cfg(feature = "curve25519-dalek")]
mod ristretto {
    use super::*;
    use elastic_sigma::group::Ristretto;

    #[test]
    fn dlog_protocol() {
        test_dlog_protocol(Ristretto::default());
    }

    #[test]
    fn dh_protocols() {
        test_dh_protocols(Ristretto::default());
    }

    #[test]
    fn commitment_protocols() {
        test_commitment_protocols(Ristretto::default());
    }

    #[test]
    fn challenge_length_is_enforced() {
        test_challenge_length_is_enforced(Ristretto::default());
    }

    #[test]
    fn large_soundness_parameter() {
        let group = Ristretto::default();
        DlogProver::new(group.clone(), SoundnessParam::new(248).unwrap()).unwrap();
        let err = DlogProver::new(group, SoundnessParam::new(256).unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::SoundnessTooLarge { .. }), "{err:?}");
    }
}

#[cfg(feature = "elliptic-curve")]
mod k256 {
    use super::*;
    use elastic_sigma::group::Generic;

    type K256 = Generic<::k256::Secp256k1>;

    #[test]
    fn dlog_protocol() {
        test_dlog_protocol(K256::default());
    }

    #[test]
    fn dh_protocols() {
        test_dh_protocols(K256::default());
    }

    #[test]
    fn commitment_protocols() {
        test_commitment_protocols(K256::default());
    }

    #[test]
    fn challenge_length_is_enforced() {
        test_challenge_length_is_enforced(K256::default());
    }
}

mod damgard_jurik {
    use super::*;

    type Input = ProverInput<()>;

    #[test]
    fn encrypted_zero_and_value() {
        let mut rng = seeded_rng(5);
        let soundness = SoundnessParam::DEFAULT;
        let key = dj_key(1);

        let (ciphertext, randomness) = key.encrypt(&BigUint::from(0_u32), &mut rng);
        let input: Input = ProverInput::new(
            CommonInput::DjEncryptedZero {
                key: key.clone(),
                ciphertext,
            },
            Witness::DjRandomness(randomness),
        );
        let mut prover = DjEncryptedZeroProver::new(soundness);
        let mut verifier = DjEncryptedZeroVerifier::new(soundness);
        assert!(run_protocol::<()>(&mut prover, &mut verifier, &input, &mut rng));

        let plaintext = BigUint::from(1_000_000_u32);
        let (ciphertext, randomness) = key.encrypt(&plaintext, &mut rng);
        let input: Input = ProverInput::new(
            CommonInput::DjEncryptedValue {
                key,
                ciphertext,
                plaintext,
            },
            Witness::DjRandomness(randomness),
        );
        let mut prover = DjEncryptedValueProver::new(soundness);
        let mut verifier = DjEncryptedValueVerifier::new(soundness);
        assert!(run_protocol::<()>(&mut prover, &mut verifier, &input, &mut rng));
    }

    #[test]
    fn product() {
        let mut rng = seeded_rng(6);
        let soundness = SoundnessParam::DEFAULT;
        let key = dj_key(2);

        let (x1, x2) = (BigUint::from(12_345_u32), BigUint::from(67_890_u32));
        let (c1, r1) = key.encrypt(&x1, &mut rng);
        let (c2, r2) = key.encrypt(&x2, &mut rng);
        let (c3, r3) = key.encrypt(&(&x1 * &x2), &mut rng);
        let common = CommonInput::DjProduct {
            key: key.clone(),
            c1,
            c2,
            c3,
        };
        let input: Input = ProverInput::new(
            common.clone(),
            Witness::DjProduct {
                x1: x1.into(),
                r1,
                r2,
                r3,
            },
        );
        let mut prover = DjProductProver::new(soundness);
        let mut verifier = DjProductVerifier::new(soundness);
        assert!(run_protocol::<()>(&mut prover, &mut verifier, &input, &mut rng));

        let simulator = DjProductSimulator::new(soundness);
        let transcript = SigmaSimulator::<()>::simulate(&simulator, &common, &mut rng).unwrap();
        SigmaVerifierComputation::<()>::set_challenge(&mut verifier, &transcript.challenge)
            .unwrap();
        assert!(verifier
            .verify(&common, &transcript.first, &transcript.second)
            .unwrap());
    }

    #[test]
    fn short_modulus_is_rejected() {
        let mut rng = seeded_rng(7);
        let p = BigUint::from(1_000_003_u32);
        let q = BigUint::from(1_000_033_u32);
        let key = elastic_sigma::DamgardJurikKey::from_primes(&p, &q, 1).unwrap();
        let (ciphertext, randomness) = key.encrypt(&BigUint::from(0_u32), &mut rng);
        let input: Input = ProverInput::new(
            CommonInput::DjEncryptedZero { key, ciphertext },
            Witness::DjRandomness(randomness),
        );

        let mut prover = DjEncryptedZeroProver::new(SoundnessParam::DEFAULT);
        let err = SigmaProverComputation::<()>::compute_first_message(&mut prover, &input, &mut rng)
            .unwrap_err();
        assert!(
            matches!(
                err,
                ProtocolError::Config(ConfigError::SoundnessTooLargeForModulus { .. })
            ),
            "{err:?}"
        );
    }
}
