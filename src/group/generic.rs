//! Elliptic curve groups implemented via traits from the `elliptic-curve` crate.

use elliptic_curve::{
    bigint::ArrayEncoding,
    group::{Curve as _, Group as _},
    ops::Reduce,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, Curve, CurveArithmetic, FieldBytes, FieldBytesSize, ProjectivePoint, Scalar,
};
use num_bigint::BigUint;

use std::{fmt, marker::PhantomData};

use super::DlogGroup;

/// Generic prime-order elliptic curve group based on traits from the [`elliptic-curve`] crate.
/// Elements are serialized in the compressed SEC1 format.
///
/// [`elliptic-curve`]: https://docs.rs/elliptic-curve/
pub struct Generic<C> {
    order: BigUint,
    _curve: PhantomData<C>,
}

impl<C> fmt::Debug for Generic<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Generic")
            .field("order", &self.order)
            .finish()
    }
}

impl<C> Clone for Generic<C> {
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            _curve: PhantomData,
        }
    }
}

impl<C: Curve> Default for Generic<C> {
    fn default() -> Self {
        let order_bytes = C::ORDER.to_be_byte_array();
        Self {
            order: BigUint::from_bytes_be(order_bytes.as_slice()),
            _curve: PhantomData,
        }
    }
}

impl<C> Generic<C>
where
    C: CurveArithmetic,
    Scalar<C>: Reduce<C::Uint, Bytes = FieldBytes<C>>,
{
    fn scalar(&self, exponent: &BigUint) -> Scalar<C> {
        let reduced = (exponent % &self.order).to_bytes_be();
        let mut repr = FieldBytes::<C>::default();
        let repr_len = repr.len();
        let start = repr_len.saturating_sub(reduced.len());
        repr[start..].copy_from_slice(&reduced[reduced.len().saturating_sub(repr_len)..]);
        <Scalar<C> as Reduce<C::Uint>>::reduce_bytes(&repr)
    }
}

impl<C> DlogGroup for Generic<C>
where
    C: CurveArithmetic,
    Scalar<C>: Reduce<C::Uint, Bytes = FieldBytes<C>>,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    type Element = ProjectivePoint<C>;

    fn generator(&self) -> Self::Element {
        ProjectivePoint::<C>::generator()
    }

    fn order(&self) -> &BigUint {
        &self.order
    }

    fn identity(&self) -> Self::Element {
        ProjectivePoint::<C>::identity()
    }

    fn exponentiate(&self, base: &Self::Element, exponent: &BigUint) -> Self::Element {
        *base * self.scalar(exponent)
    }

    fn multiply(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element {
        *lhs + *rhs
    }

    fn invert(&self, element: &Self::Element) -> Self::Element {
        -*element
    }

    fn is_member(&self, _element: &Self::Element) -> bool {
        // Supported curves have prime order, so every point is a member.
        true
    }

    fn validate_group(&self) -> bool {
        let generator = self.generator();
        let last = self.exponentiate(&generator, &(&self.order - 1_u32));
        bool::from((last + generator).is_identity()) && !bool::from(generator.is_identity())
    }

    fn serialize_element(&self, element: &Self::Element) -> Vec<u8> {
        element.to_affine().to_encoded_point(true).as_bytes().to_vec()
    }

    fn reconstruct_element(&self, bytes: &[u8]) -> Option<Self::Element> {
        let encoded = EncodedPoint::<C>::from_bytes(bytes).ok()?;
        let affine: Option<AffinePoint<C>> = AffinePoint::<C>::from_encoded_point(&encoded).into();
        affine.map(ProjectivePoint::<C>::from)
    }
}
