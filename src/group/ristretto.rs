//! Ristretto255 group backed by `curve25519-dalek`.

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::{Identity, IsIdentity, VartimeMultiscalarMul},
};
use num_bigint::BigUint;

use super::DlogGroup;

/// Order of the ristretto255 group, `2^252 + 27742317777372353535851937790883648493`,
/// in little-endian byte order.
const GROUP_ORDER: [u8; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde,
    0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x10,
];

/// [Ristretto](https://ristretto.group/) transform of Curve25519, also known as ristretto255.
///
/// Implementation is based on the `curve25519-dalek` crate. Group operations (other than
/// the two-base exponentiation used in verification) are constant-time.
#[derive(Debug, Clone)]
pub struct Ristretto {
    order: BigUint,
}

impl Default for Ristretto {
    fn default() -> Self {
        Self {
            order: BigUint::from_bytes_le(&GROUP_ORDER),
        }
    }
}

impl Ristretto {
    fn scalar(&self, exponent: &BigUint) -> Scalar {
        let mut bytes = [0_u8; 32];
        let reduced = (exponent % &self.order).to_bytes_le();
        bytes[..reduced.len()].copy_from_slice(&reduced);
        Scalar::from_bytes_mod_order(bytes)
    }
}

impl DlogGroup for Ristretto {
    type Element = RistrettoPoint;

    fn generator(&self) -> RistrettoPoint {
        RISTRETTO_BASEPOINT_POINT
    }

    fn order(&self) -> &BigUint {
        &self.order
    }

    fn identity(&self) -> RistrettoPoint {
        RistrettoPoint::identity()
    }

    fn exponentiate(&self, base: &RistrettoPoint, exponent: &BigUint) -> RistrettoPoint {
        base * self.scalar(exponent)
    }

    fn exponentiate_generator(&self, exponent: &BigUint) -> RistrettoPoint {
        RistrettoPoint::mul_base(&self.scalar(exponent))
    }

    fn multiply(&self, lhs: &RistrettoPoint, rhs: &RistrettoPoint) -> RistrettoPoint {
        lhs + rhs
    }

    fn invert(&self, element: &RistrettoPoint) -> RistrettoPoint {
        -element
    }

    fn is_member(&self, _element: &RistrettoPoint) -> bool {
        // Every `RistrettoPoint` is a member of the prime-order group.
        true
    }

    fn validate_group(&self) -> bool {
        let order_point = RistrettoPoint::mul_base(&self.scalar(&(&self.order - 1_u32)))
            + RISTRETTO_BASEPOINT_POINT;
        order_point.is_identity() && !RISTRETTO_BASEPOINT_POINT.is_identity()
    }

    fn serialize_element(&self, element: &RistrettoPoint) -> Vec<u8> {
        element.compress().to_bytes().to_vec()
    }

    fn reconstruct_element(&self, bytes: &[u8]) -> Option<RistrettoPoint> {
        CompressedRistretto::from_slice(bytes).ok()?.decompress()
    }

    fn double_exponentiate(
        &self,
        base: &RistrettoPoint,
        exponent: &BigUint,
        other: &RistrettoPoint,
        other_exponent: &BigUint,
    ) -> RistrettoPoint {
        RistrettoPoint::vartime_multiscalar_mul(
            [self.scalar(exponent), self.scalar(other_exponent)],
            [*base, *other],
        )
    }
}
