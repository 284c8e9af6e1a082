//! Challenge byte strings and operations on them.

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use crate::config::SoundnessParam;

/// Samples a uniformly random challenge of `t / 8` bytes.
pub fn random_challenge(soundness: SoundnessParam, rng: &mut dyn CryptoRngCore) -> Vec<u8> {
    let mut challenge = vec![0_u8; soundness.byte_len()];
    rng.fill_bytes(&mut challenge);
    challenge
}

/// Interprets a challenge as an unsigned big-endian integer.
pub fn challenge_to_int(challenge: &[u8]) -> BigUint {
    BigUint::from_bytes_be(challenge)
}

/// XORs `other` into `acc`. Both slices must have the same length.
pub(crate) fn xor_into(acc: &mut [u8], other: &[u8]) {
    debug_assert_eq!(acc.len(), other.len());
    for (acc_byte, &byte) in acc.iter_mut().zip(other) {
        *acc_byte ^= byte;
    }
}
