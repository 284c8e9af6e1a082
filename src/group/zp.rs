//! Prime-order subgroups of `Z_p^*`.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use std::sync::OnceLock;

use super::DlogGroup;
use crate::errors::ConfigError;

/// Big-endian 2048-bit MODP prime from RFC 3526, section 3.
const RFC3526_2048_PRIME: [u8; 256] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xc9, 0x0f, 0xda, 0xa2,
    0x21, 0x68, 0xc2, 0x34, 0xc4, 0xc6, 0x62, 0x8b, 0x80, 0xdc, 0x1c, 0xd1,
    0x29, 0x02, 0x4e, 0x08, 0x8a, 0x67, 0xcc, 0x74, 0x02, 0x0b, 0xbe, 0xa6,
    0x3b, 0x13, 0x9b, 0x22, 0x51, 0x4a, 0x08, 0x79, 0x8e, 0x34, 0x04, 0xdd,
    0xef, 0x95, 0x19, 0xb3, 0xcd, 0x3a, 0x43, 0x1b, 0x30, 0x2b, 0x0a, 0x6d,
    0xf2, 0x5f, 0x14, 0x37, 0x4f, 0xe1, 0x35, 0x6d, 0x6d, 0x51, 0xc2, 0x45,
    0xe4, 0x85, 0xb5, 0x76, 0x62, 0x5e, 0x7e, 0xc6, 0xf4, 0x4c, 0x42, 0xe9,
    0xa6, 0x37, 0xed, 0x6b, 0x0b, 0xff, 0x5c, 0xb6, 0xf4, 0x06, 0xb7, 0xed,
    0xee, 0x38, 0x6b, 0xfb, 0x5a, 0x89, 0x9f, 0xa5, 0xae, 0x9f, 0x24, 0x11,
    0x7c, 0x4b, 0x1f, 0xe6, 0x49, 0x28, 0x66, 0x51, 0xec, 0xe4, 0x5b, 0x3d,
    0xc2, 0x00, 0x7c, 0xb8, 0xa1, 0x63, 0xbf, 0x05, 0x98, 0xda, 0x48, 0x36,
    0x1c, 0x55, 0xd3, 0x9a, 0x69, 0x16, 0x3f, 0xa8, 0xfd, 0x24, 0xcf, 0x5f,
    0x83, 0x65, 0x5d, 0x23, 0xdc, 0xa3, 0xad, 0x96, 0x1c, 0x62, 0xf3, 0x56,
    0x20, 0x85, 0x52, 0xbb, 0x9e, 0xd5, 0x29, 0x07, 0x70, 0x96, 0x96, 0x6d,
    0x67, 0x0c, 0x35, 0x4e, 0x4a, 0xbc, 0x98, 0x04, 0xf1, 0x74, 0x6c, 0x08,
    0xca, 0x18, 0x21, 0x7c, 0x32, 0x90, 0x5e, 0x46, 0x2e, 0x36, 0xce, 0x3b,
    0xe3, 0x9e, 0x77, 0x2c, 0x18, 0x0e, 0x86, 0x03, 0x9b, 0x27, 0x83, 0xa2,
    0xec, 0x07, 0xa2, 0x8f, 0xb5, 0xc5, 0x5d, 0xf0, 0x6f, 0x4c, 0x52, 0xc9,
    0xde, 0x2b, 0xcb, 0xf6, 0x95, 0x58, 0x17, 0x18, 0x39, 0x95, 0x49, 0x7c,
    0xea, 0x95, 0x6a, 0xe5, 0x15, 0xd2, 0x26, 0x18, 0x98, 0xfa, 0x05, 0x10,
    0x15, 0x72, 0x8e, 0x5a, 0x8a, 0xac, 0xaa, 0x68, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff,
];

/// Bases for the Miller–Rabin test: the first 20 primes.
const WITNESS_BASES: [u32; 20] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
];

/// Prime-order-`q` subgroup of the multiplicative group of integers modulo a prime `p`.
///
/// Elements are represented as integers in `[1, p)`. Exponentiation uses modular
/// exponentiation from `num-bigint`, which is **not** constant-time.
///
/// The result of [`DlogGroup::validate_group()`] is computed once and cached.
#[derive(Debug, Clone)]
pub struct ZpGroup {
    p: BigUint,
    q: BigUint,
    g: BigUint,
    element_len: usize,
    validated: OnceLock<bool>,
}

impl ZpGroup {
    /// Creates a group with the specified modulus `p`, order `q` and generator `g`,
    /// and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters do not describe a prime-order subgroup of `Z_p^*`
    /// generated by `g`.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self, ConfigError> {
        let group = Self::new_unchecked(p, q, g);
        if group.validate_group() {
            Ok(group)
        } else {
            Err(ConfigError::InvalidGroup(
                "(p, q, g) do not define a prime-order subgroup of Z_p^*",
            ))
        }
    }

    /// Creates a group without validating the parameters. Validation will be performed
    /// lazily on the first call to [`DlogGroup::validate_group()`].
    pub fn new_unchecked(p: BigUint, q: BigUint, g: BigUint) -> Self {
        let element_len = usize::try_from((p.bits() + 7) / 8).unwrap_or(usize::MAX);
        Self {
            p,
            q,
            g,
            element_len,
            validated: OnceLock::new(),
        }
    }

    /// Returns the 2048-bit MODP group from [RFC 3526], with `q = (p - 1) / 2`
    /// and `g = 2`.
    ///
    /// [RFC 3526]: https://www.rfc-editor.org/rfc/rfc3526#section-3
    pub fn rfc3526_2048() -> Self {
        let p = BigUint::from_bytes_be(&RFC3526_2048_PRIME);
        let q = (&p - 1_u32) >> 1_u32;
        Self::new_unchecked(p, q, BigUint::from(2_u32))
    }

    /// Returns the modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    fn check_parameters(&self) -> bool {
        let (p, q, g) = (&self.p, &self.q, &self.g);
        if *p <= BigUint::from(3_u32) || q.is_zero() {
            return false;
        }
        let p_minus_one = p - 1_u32;
        p_minus_one.is_multiple_of(q)
            && *g > BigUint::one()
            && g < p
            && g.modpow(q, p).is_one()
            && is_probable_prime(q)
            && is_probable_prime(p)
    }
}

impl DlogGroup for ZpGroup {
    type Element = BigUint;

    fn generator(&self) -> BigUint {
        self.g.clone()
    }

    fn order(&self) -> &BigUint {
        &self.q
    }

    fn identity(&self) -> BigUint {
        BigUint::one()
    }

    fn exponentiate(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        base.modpow(exponent, &self.p)
    }

    fn multiply(&self, lhs: &BigUint, rhs: &BigUint) -> BigUint {
        (lhs * rhs) % &self.p
    }

    fn invert(&self, element: &BigUint) -> BigUint {
        // Every member satisfies `x^q = 1`, so `x^(q - 1)` is its inverse.
        element.modpow(&(&self.q - 1_u32), &self.p)
    }

    fn is_member(&self, element: &BigUint) -> bool {
        !element.is_zero() && *element < self.p && element.modpow(&self.q, &self.p).is_one()
    }

    fn validate_group(&self) -> bool {
        *self.validated.get_or_init(|| self.check_parameters())
    }

    fn serialize_element(&self, element: &BigUint) -> Vec<u8> {
        let bytes = element.to_bytes_be();
        let mut output = vec![0_u8; self.element_len.saturating_sub(bytes.len())];
        output.extend_from_slice(&bytes);
        output
    }

    fn reconstruct_element(&self, bytes: &[u8]) -> Option<BigUint> {
        if bytes.len() != self.element_len {
            return None;
        }
        let element = BigUint::from_bytes_be(bytes);
        self.is_member(&element).then_some(element)
    }
}

/// Miller–Rabin test with fixed bases. Deterministic for `n < 3.3 * 10^24`; for larger
/// numbers, a composite passes with probability at most `4^-20`.
pub(crate) fn is_probable_prime(n: &BigUint) -> bool {
    let two = BigUint::from(2_u32);
    if *n < two {
        return false;
    }
    for &base in &WITNESS_BASES {
        let base = BigUint::from(base);
        if *n == base {
            return true;
        }
        if (n % &base).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1_u32;
    let shift = n_minus_one.trailing_zeros().unwrap_or(0);
    let odd_part = &n_minus_one >> shift;

    'bases: for &base in &WITNESS_BASES {
        let mut x = BigUint::from(base).modpow(&odd_part, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..shift {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'bases;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primality_test() {
        let primes = [2_u64, 3, 5, 71, 73, 1019, 2039, 2_147_483_647, (1 << 61) - 1];
        for p in primes {
            assert!(is_probable_prime(&BigUint::from(p)), "{p}");
        }
        // 561 is a Carmichael number; 3215031751 is a strong pseudoprime to bases 2, 3, 5, 7.
        let composites = [0_u64, 1, 4, 561, 1_373_653, 3_215_031_751, 1 << 61];
        for n in composites {
            assert!(!is_probable_prime(&BigUint::from(n)), "{n}");
        }
    }

    #[test]
    fn rfc3526_group_is_valid() {
        let group = ZpGroup::rfc3526_2048();
        assert_eq!(group.modulus().bits(), 2048);
        assert_eq!(group.order().bits(), 2047);
        assert!(group.validate_group());
        // Cached result
        assert!(group.validate_group());
    }

    #[test]
    fn invalid_groups_are_rejected() {
        let small = |p: u32, q: u32, g: u32| ZpGroup::new(p.into(), q.into(), g.into());

        assert!(small(2039, 1019, 4).is_ok());
        // `q` does not divide `p - 1`
        assert!(small(2039, 1021, 4).is_err());
        // `g` is not in the subgroup of order `q` (7 is a quadratic non-residue mod 2039)
        assert!(small(2039, 1019, 7).is_err());
        // `g = 1`
        assert!(small(2039, 1019, 1).is_err());
        // composite `p`
        assert!(small(2041, 1020, 4).is_err());
    }

    #[test]
    fn element_membership() {
        let group = ZpGroup::new_unchecked(2039_u32.into(), 1019_u32.into(), 4_u32.into());
        assert!(group.is_member(&BigUint::from(4_u32)));
        assert!(!group.is_member(&BigUint::zero()));
        assert!(!group.is_member(&BigUint::from(2039_u32)));
        assert!(!group.is_member(&BigUint::from(2038_u32))); // -1 has order 2

        assert_eq!(group.serialize_element(&BigUint::from(4_u32)), [0, 4]);
        assert_eq!(group.reconstruct_element(&[0, 4]), Some(BigUint::from(4_u32)));
        assert_eq!(group.reconstruct_element(&[4]), None);
        assert_eq!(group.reconstruct_element(&[7, 246]), None); // 2038
    }
}
