//! Tests for orchestrators running over channels.

use num_bigint::BigUint;

use std::{
    io,
    net::{TcpListener, TcpStream},
    thread,
};

use crate::seeded_rng;
use elastic_sigma::{
    composition::{SigmaOrProverComputation, SigmaOrVerifierComputation},
    group::{DlogGroup, ZpGroup},
    interactive::{SigmaProver, SigmaVerifier},
    protocols::{DlogProver, DlogVerifier},
    Channel, CommonInput, MemoryChannel, OrBranch, ProtocolError, ProverInput, SigmaMessage,
    SigmaProverComputation, SigmaVerifierComputation, SoundnessParam, StreamChannel, Witness,
};

fn toy_group() -> ZpGroup {
    ZpGroup::new(2039_u32.into(), 1019_u32.into(), 4_u32.into()).unwrap()
}

fn soundness() -> SoundnessParam {
    SoundnessParam::new(8).unwrap()
}

fn dlog_input(group: &ZpGroup, w: u64) -> ProverInput<BigUint> {
    let common = CommonInput::Dlog {
        h: group.exponentiate_generator(&w.into()),
    };
    ProverInput::new(common, Witness::exponent(w))
}

#[test_log::test]
fn or_proof_over_memory_channel() {
    let group = toy_group();
    let input = ProverInput::or(vec![
        OrBranch::Simulated(dlog_input(&group, 11).common().clone()),
        OrBranch::Real(dlog_input(&group, 22)),
        OrBranch::Simulated(dlog_input(&group, 33).common().clone()),
    ])
    .unwrap();
    let common = input.common().clone();

    let (prover_channel, verifier_channel) = MemoryChannel::pair();
    let prover_group = group.clone();
    let prover_thread = thread::spawn(move || {
        // Boxed computations are not `Send`, so the composition is built in place.
        let branches = (0..3)
            .map(|_| {
                let prover = DlogProver::new(prover_group.clone(), soundness()).unwrap();
                Box::new(prover) as Box<dyn SigmaProverComputation<BigUint>>
            })
            .collect();
        let computation = SigmaOrProverComputation::new(branches).unwrap();
        let mut prover = SigmaProver::new(computation, prover_channel);
        prover.prove(&input, &mut seeded_rng(100))
    });

    let branches = (0..3)
        .map(|_| {
            let verifier = DlogVerifier::new(group.clone(), soundness()).unwrap();
            Box::new(verifier) as Box<dyn SigmaVerifierComputation<BigUint>>
        })
        .collect();
    let computation = SigmaOrVerifierComputation::new(branches).unwrap();
    let mut verifier = SigmaVerifier::new(computation, verifier_channel);
    assert!(verifier.verify(&common, &mut seeded_rng(101)).unwrap());
    prover_thread.join().unwrap().unwrap();
}

#[test_log::test]
fn proof_over_tcp() -> io::Result<()> {
    let group = toy_group();
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;
    let input = dlog_input(&group, 555);
    let common = input.common().clone();

    let computation = DlogProver::new(group.clone(), soundness()).unwrap();
    let prover_thread = thread::spawn(move || {
        let stream = TcpStream::connect(address).unwrap();
        let mut prover = SigmaProver::new(computation, StreamChannel::new(stream));
        prover.prove(&input, &mut seeded_rng(200))
    });

    let (stream, _) = listener.accept()?;
    let computation = DlogVerifier::new(group, soundness()).unwrap();
    let mut verifier = SigmaVerifier::new(computation, StreamChannel::new(stream));
    assert!(verifier.verify(&common, &mut seeded_rng(201)).unwrap());
    prover_thread.join().unwrap().unwrap();
    Ok(())
}

#[test_log::test]
fn externally_set_challenge() {
    let group = toy_group();
    let input = dlog_input(&group, 3);
    let common = input.common().clone();
    let (prover_channel, verifier_channel) = MemoryChannel::pair();

    let computation = DlogProver::new(group.clone(), soundness()).unwrap();
    let prover_thread = thread::spawn(move || {
        let mut prover = SigmaProver::new(computation, prover_channel);
        prover.process_first_message(&input, &mut seeded_rng(300))?;
        assert!(prover.is_waiting_for_challenge());
        prover.process_second_message::<BigUint>()
    });

    let computation = DlogVerifier::new(group, soundness()).unwrap();
    let mut verifier = SigmaVerifier::new(computation, verifier_channel);
    verifier.set_challenge::<BigUint>(&[0x42]).unwrap();
    verifier.send_challenge::<BigUint>().unwrap();
    assert!(verifier.process_verify(&common).unwrap());
    prover_thread.join().unwrap().unwrap();
}

#[test_log::test]
fn cheating_verifier_is_detected() {
    let group = toy_group();
    let input = dlog_input(&group, 3);
    let (prover_channel, mut verifier_channel) = MemoryChannel::pair();

    let computation = DlogProver::new(group, soundness()).unwrap();
    let prover_thread = thread::spawn(move || {
        let mut prover = SigmaProver::new(computation, prover_channel);
        prover.prove(&input, &mut seeded_rng(400))
    });

    let first = SigmaMessage::from_bytes(&verifier_channel.receive().unwrap()).unwrap();
    assert!(matches!(first, SigmaMessage::Element(_)));
    // Challenge is 2 bytes instead of 1.
    verifier_channel.send(&[1, 2]).unwrap();
    let err = prover_thread.join().unwrap().unwrap_err();
    assert!(err.is_cheat_attempt(), "{err:?}");
}

#[test_log::test]
fn malformed_first_message() {
    let group = toy_group();
    let (mut prover_channel, verifier_channel) = MemoryChannel::pair();
    let computation = DlogVerifier::new(group, soundness()).unwrap();
    let mut verifier = SigmaVerifier::new(computation, verifier_channel);

    prover_channel.send(&[0xff; 5]).unwrap();
    verifier.sample_challenge::<BigUint>(&mut seeded_rng(500));
    let err = verifier.send_challenge::<BigUint>().unwrap_err();
    assert!(matches!(err, ProtocolError::Codec { .. }), "{err:?}");
    assert!(verifier.computation().challenge().is_none());

    // The challenge needs to be set anew.
    let err = verifier.send_challenge::<BigUint>().unwrap_err();
    assert!(matches!(err, ProtocolError::IllegalState { .. }), "{err:?}");
}

#[test_log::test]
fn deeply_nested_first_message() {
    let group = toy_group();
    let (mut prover_channel, verifier_channel) = MemoryChannel::pair();
    let computation = DlogVerifier::new(group, soundness()).unwrap();
    let mut verifier = SigmaVerifier::new(computation, verifier_channel);

    // `Multiple` messages each containing a single `Multiple` message.
    let header = [6_u8, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0];
    prover_channel.send(&header.repeat(100_000)).unwrap();
    verifier.sample_challenge::<BigUint>(&mut seeded_rng(510));
    let err = verifier.send_challenge::<BigUint>().unwrap_err();
    assert!(matches!(err, ProtocolError::Codec { .. }), "{err:?}");
    assert!(verifier.computation().challenge().is_none());
}
