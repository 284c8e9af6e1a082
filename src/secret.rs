//! Secret big integers that are wiped when no longer needed.

use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::{Zeroize, ZeroizeOnDrop};

use std::fmt;

/// Secret non-negative integer, such as a witness or ephemeral randomness of a prover.
///
/// The wrapped value is overwritten with zeros when the secret is dropped or explicitly
/// [zeroized](Zeroize). `Debug` output never includes the value.
#[derive(Clone, Default)]
pub struct SecretExponent(BigUint);

impl SecretExponent {
    /// Wraps the provided value.
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Exposes the secret value.
    pub fn expose(&self) -> &BigUint {
        &self.0
    }

    /// Checks whether the value is zero (e.g., after it was wiped).
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<BigUint> for SecretExponent {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for SecretExponent {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Debug for SecretExponent {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("SecretExponent(_)")
    }
}

impl Zeroize for SecretExponent {
    fn zeroize(&mut self) {
        // Overwrites the existing digit buffer in place before it is normalized to zero.
        let digit_count = self.0.iter_u32_digits().len();
        if digit_count > 0 {
            let zeros = vec![0_u32; digit_count];
            self.0.assign_from_slice(&zeros);
        }
        self.0.set_zero();
    }
}

impl Drop for SecretExponent {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretExponent {}
