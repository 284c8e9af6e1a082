//! Tests for message and proof (de)serialization.

use merlin::Transcript;
use num_bigint::BigUint;
use serde_json::json;

use crate::{dj_key, seeded_rng};
use elastic_sigma::{
    composition::{SigmaOrProverComputation, SigmaOrVerifierComputation},
    group::{DlogGroup, ZpGroup},
    protocols::{DlogProver, DlogVerifier},
    CommonInput, DamgardJurikKey, NonInteractiveProof, OrBranch, ProtocolConfig, ProverInput,
    SigmaMessage, SigmaProverComputation, SigmaVerifierComputation, SoundnessParam, Witness,
};

fn sample_messages() -> Vec<SigmaMessage> {
    let int = |value: u32| BigUint::from(value);
    vec![
        SigmaMessage::Element(vec![1, 2, 3]),
        SigmaMessage::BigInt(int(42)),
        SigmaMessage::Dh {
            a: vec![0xfb, 0xff],
            b: vec![],
        },
        SigmaMessage::Pedersen { u: int(1), v: int(2) },
        SigmaMessage::DjProductFirst {
            a1: int(3),
            a2: BigUint::from(u64::MAX) * int(7),
        },
        SigmaMessage::DjProductSecond {
            z1: int(4),
            z2: int(5),
            z3: int(6),
        },
        SigmaMessage::Multiple(vec![
            SigmaMessage::Element(vec![9; 32]),
            SigmaMessage::BigInt(int(0)),
        ]),
        SigmaMessage::Or {
            challenges: vec![vec![1; 10], vec![2; 10]],
            responses: vec![SigmaMessage::BigInt(int(7)), SigmaMessage::BigInt(int(8))],
        },
    ]
}

#[test]
fn binary_message_encoding() {
    for message in sample_messages() {
        let bytes = message.to_bytes().unwrap();
        assert_eq!(SigmaMessage::from_bytes(&bytes).unwrap(), message);
        // Truncated messages cannot be decoded.
        assert!(SigmaMessage::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}

#[test]
fn json_message_encoding() {
    for message in sample_messages() {
        let json = serde_json::to_value(&message).unwrap();
        let restored: SigmaMessage = serde_json::from_value(json).unwrap();
        assert_eq!(restored, message);
    }

    let message = SigmaMessage::Dh {
        a: vec![0xfb, 0xff],
        b: vec![1, 2, 3],
    };
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json, json!({ "Dh": { "a": "-_8", "b": "AQID" } }));

    let message = SigmaMessage::Or {
        challenges: vec![vec![1, 2, 3], vec![]],
        responses: vec![],
    };
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(
        json,
        json!({ "Or": { "challenges": ["AQID", ""], "responses": [] } })
    );
}

#[test]
fn non_interactive_proof_survives_json() {
    let mut rng = seeded_rng(700);
    let group = ZpGroup::rfc3526_2048();
    let soundness = SoundnessParam::DEFAULT;
    let statements: Vec<_> = (0..3)
        .map(|_| {
            let w = group.random_exponent(&mut rng);
            let h = group.exponentiate_generator(&w);
            (CommonInput::Dlog { h }, w)
        })
        .collect();
    let branches = statements
        .iter()
        .enumerate()
        .map(|(i, (common, w))| {
            if i == 1 {
                OrBranch::Real(ProverInput::new(common.clone(), Witness::exponent(w.clone())))
            } else {
                OrBranch::Simulated(common.clone())
            }
        })
        .collect();
    let input = ProverInput::or(branches).unwrap();

    let provers = (0..3)
        .map(|_| {
            let prover = DlogProver::new(group.clone(), soundness).unwrap();
            Box::new(prover) as Box<dyn SigmaProverComputation<BigUint>>
        })
        .collect();
    let mut prover = SigmaOrProverComputation::new(provers).unwrap();
    let proof = NonInteractiveProof::new(
        &group,
        &mut prover,
        &input,
        &mut Transcript::new(b"serialization"),
        &mut rng,
    )
    .unwrap();

    let json = serde_json::to_string(&proof).unwrap();
    let restored: NonInteractiveProof = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, proof);
    let bytes = bincode::serialize(&proof).unwrap();
    let restored_from_bytes: NonInteractiveProof = bincode::deserialize(&bytes).unwrap();
    assert_eq!(restored_from_bytes, proof);

    let verifiers = (0..3)
        .map(|_| {
            let verifier = DlogVerifier::new(group.clone(), soundness).unwrap();
            Box::new(verifier) as Box<dyn SigmaVerifierComputation<BigUint>>
        })
        .collect();
    let mut verifier = SigmaOrVerifierComputation::new(verifiers).unwrap();
    let transcript = &mut Transcript::new(b"serialization");
    assert!(restored
        .verify(&group, &mut verifier, input.common(), transcript)
        .unwrap());

    // Another transcript context yields another challenge.
    let transcript = &mut Transcript::new(b"other");
    assert!(!restored
        .verify(&group, &mut verifier, input.common(), transcript)
        .unwrap());
}

#[test]
fn protocol_config_from_json() {
    let config: ProtocolConfig =
        serde_json::from_value(json!({ "soundness_bits": 80, "group": "rfc3526-2048" })).unwrap();
    let group = config.zp_group().unwrap();
    assert_eq!(group.modulus(), ZpGroup::rfc3526_2048().modulus());
    assert_eq!(group.generator(), BigUint::from(2_u32));

    let config: ProtocolConfig = serde_json::from_value(json!({
        "soundness_bits": 8,
        "group": { "p": "0x7f7", "q": "3fb", "g": "4" },
    }))
    .unwrap();
    let group = config.zp_group().unwrap();
    assert_eq!(*group.order(), BigUint::from(1019_u32));
    config.soundness_bits.check_order(group.order()).unwrap();

    let err = serde_json::from_value::<ProtocolConfig>(json!({ "soundness": 80 }))
        .unwrap_err()
        .to_string();
    assert!(err.contains("unknown field"), "{err}");

    let config: ProtocolConfig = serde_json::from_value(json!({ "soundness_bits": 80 })).unwrap();
    assert!(config.zp_group().is_err());
}

#[test]
fn damgard_jurik_key_serialization() {
    let key = dj_key(2);
    let json = serde_json::to_value(&key).unwrap();
    assert_eq!(json["s"], json!(2));
    let restored: DamgardJurikKey = serde_json::from_value(json).unwrap();
    assert_eq!(restored, key);

    let bytes = bincode::serialize(&key).unwrap();
    let restored: DamgardJurikKey = bincode::deserialize(&bytes).unwrap();
    assert_eq!(restored, key);

    let restored: DamgardJurikKey = serde_json::from_value(json!({ "n": [1019], "s": 1 })).unwrap();
    assert_eq!(restored.modulus(), &BigUint::from(1019_u32));
    assert_eq!(restored.length(), 1);

    let invalid_keys = [
        json!({ "n": [1019], "s": 0 }),
        json!({ "n": [1019], "s": u32::MAX }),
        json!({ "n": [1024], "s": 2 }),
        json!({ "n": [3], "s": 1 }),
    ];
    for invalid_key in invalid_keys {
        let err = serde_json::from_value::<DamgardJurikKey>(invalid_key.clone()).unwrap_err();
        assert!(err.to_string().contains("Damgård–Jurik"), "{invalid_key}: {err}");
    }

    let bytes = bincode::serialize(&(BigUint::from(1019_u32), 0_u32)).unwrap();
    assert!(bincode::deserialize::<DamgardJurikKey>(&bytes).is_err());
}
