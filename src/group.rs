//! Cyclic groups of prime order in which the discrete log problem is believed to be hard,
//! and several implementations of such groups.
//!
//! Protocols in this crate consume groups exclusively via the [`DlogGroup`] capability.
//! Exponents are represented as [`BigUint`]s; a group implementation is responsible
//! for reducing them modulo the group order where necessary.

use num_bigint::{BigUint, RandBigInt};
use rand_core::CryptoRngCore;

use std::fmt;

#[cfg(feature = "elliptic-curve")]
mod generic;
#[cfg(feature = "curve25519-dalek")]
mod ristretto;
mod zp;

#[cfg(feature = "elliptic-curve")]
#[cfg_attr(docsrs, doc(cfg(feature = "elliptic-curve")))]
pub use self::generic::Generic;
#[cfg(feature = "curve25519-dalek")]
#[cfg_attr(docsrs, doc(cfg(feature = "curve25519-dalek")))]
pub use self::ristretto::Ristretto;
pub use self::zp::ZpGroup;

pub(crate) use self::zp::is_probable_prime;

/// Cyclic group of a known prime order `q` with an agreed-upon generator `g`.
///
/// The trait is object-safe; protocols hold groups by value and are generic over them,
/// while composition layers only see the [`Element`](Self::Element) type.
///
/// This crate provides the following implementations:
///
/// - [`ZpGroup`], a prime-order subgroup of the multiplicative group of integers modulo
///   a safe (or any suitable) prime `p`.
/// - [`Ristretto`], the ristretto255 group based on Curve25519.
/// - [`Generic`] implementation defined in terms of traits from the [`elliptic-curve`] crate
///   (e.g., secp256k1 via the [`k256`] crate).
///
/// [`elliptic-curve`]: https://docs.rs/elliptic-curve/
/// [`k256`]: https://docs.rs/k256/
pub trait DlogGroup: fmt::Debug {
    /// Element of the group.
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    /// Returns the generator `g` of the group.
    fn generator(&self) -> Self::Element;

    /// Returns the order `q` of the group.
    fn order(&self) -> &BigUint;

    /// Returns the identity element.
    fn identity(&self) -> Self::Element;

    /// Raises `base` to the power `exponent`.
    fn exponentiate(&self, base: &Self::Element, exponent: &BigUint) -> Self::Element;

    /// Raises the generator to the power `exponent`.
    ///
    /// # Default implementation
    ///
    /// Delegates to [`Self::exponentiate()`].
    fn exponentiate_generator(&self, exponent: &BigUint) -> Self::Element {
        self.exponentiate(&self.generator(), exponent)
    }

    /// Applies the group operation to two elements.
    fn multiply(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element;

    /// Returns the inverse of `element`.
    fn invert(&self, element: &Self::Element) -> Self::Element;

    /// Checks whether `element` belongs to the group.
    fn is_member(&self, element: &Self::Element) -> bool;

    /// Checks the group parameters (e.g., primality of the order).
    fn validate_group(&self) -> bool;

    /// Serializes `element` into bytes.
    fn serialize_element(&self, element: &Self::Element) -> Vec<u8>;

    /// Restores an element from the bytes produced by [`Self::serialize_element()`].
    /// Returns `None` if the bytes do not encode a group member.
    fn reconstruct_element(&self, bytes: &[u8]) -> Option<Self::Element>;

    /// Samples an exponent uniformly at random from `[0, q)`.
    ///
    /// # Default implementation
    ///
    /// Uses rejection sampling via [`RandBigInt`].
    fn random_exponent(&self, rng: &mut dyn CryptoRngCore) -> BigUint {
        rng.gen_biguint_below(self.order())
    }

    /// Computes `base^exponent * other^other_exponent`, which is the shape of most
    /// verification equations.
    ///
    /// # Default implementation
    ///
    /// Performs two exponentiations and a multiplication.
    fn double_exponentiate(
        &self,
        base: &Self::Element,
        exponent: &BigUint,
        other: &Self::Element,
        other_exponent: &BigUint,
    ) -> Self::Element {
        let lhs = self.exponentiate(base, exponent);
        let rhs = self.exponentiate(other, other_exponent);
        self.multiply(&lhs, &rhs)
    }
}

/// Computes `(order - exponent mod order) mod order`, i.e., the additive inverse of
/// an exponent.
pub(crate) fn negate_exponent(order: &BigUint, exponent: &BigUint) -> BigUint {
    (order - exponent % order) % order
}
