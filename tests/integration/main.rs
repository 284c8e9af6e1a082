//! Integration tests for sigma protocols, compositions and orchestrators.

use num_bigint::BigUint;
use num_traits::One;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use elastic_sigma::{
    DamgardJurikKey, ProverInput, SigmaProverComputation, SigmaVerifierComputation,
};

mod composition;
mod interactive;
mod protocols;
mod serialization;

pub fn seeded_rng(seed: u64) -> ChaChaRng {
    ChaChaRng::seed_from_u64(seed)
}

/// Runs a single proof with a random challenge and returns the verification outcome.
pub fn run_protocol<E>(
    prover: &mut dyn SigmaProverComputation<E>,
    verifier: &mut dyn SigmaVerifierComputation<E>,
    input: &ProverInput<E>,
    rng: &mut ChaChaRng,
) -> bool {
    let first = prover.compute_first_message(input, rng).unwrap();
    let challenge = verifier.sample_challenge(rng);
    let second = prover.compute_second_message(&challenge).unwrap();
    assert!(!prover.has_pending_state());
    verifier.verify(input.common(), &first, &second).unwrap()
}

/// Damgård–Jurik key with a 648-bit modulus (a product of Mersenne primes),
/// long enough for the default soundness parameter.
pub fn dj_key(s: u32) -> DamgardJurikKey {
    let p = (BigUint::one() << 127_u32) - 1_u32;
    let q = (BigUint::one() << 521_u32) - 1_u32;
    DamgardJurikKey::from_primes(&p, &q, s).unwrap()
}
