//! Messages exchanged by sigma protocol participants.

use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize};

use std::cell::Cell;

use crate::errors::ProtocolError;

/// Maximum nesting depth of [`SigmaMessage::Multiple`] and [`SigmaMessage::Or`] messages
/// accepted during deserialization.
pub const MAX_NESTING_DEPTH: usize = 32;

thread_local! {
    static NESTING_DEPTH: Cell<usize> = Cell::new(0);
}

/// Tracks the nesting depth of the message being deserialized on the current thread.
struct NestingGuard(());

impl NestingGuard {
    fn enter<E: de::Error>() -> Result<Self, E> {
        NESTING_DEPTH.with(|depth| {
            let level = depth.get();
            if level >= MAX_NESTING_DEPTH {
                Err(E::custom(format_args!(
                    "message nesting exceeds {MAX_NESTING_DEPTH} levels"
                )))
            } else {
                depth.set(level + 1);
                Ok(Self(()))
            }
        })
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        NESTING_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

fn nested<'de, D>(deserializer: D) -> Result<Vec<SigmaMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let _guard = NestingGuard::enter()?;
    Vec::deserialize(deserializer)
}

/// First or second message of a sigma protocol.
///
/// Group elements are carried in their serialized form (see
/// [`DlogGroup::serialize_element()`](crate::DlogGroup::serialize_element())), so messages
/// do not depend on the group type. Field order is a part of the wire format.
///
/// Nested messages deeper than [`MAX_NESTING_DEPTH`] are rejected on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SigmaMessage {
    /// Single group element, e.g., `a = g^r` in the Dlog protocol.
    Element(#[serde(with = "crate::serde::bytes")] Vec<u8>),
    /// Single integer, e.g., the response `z` in the Dlog protocol.
    BigInt(BigUint),
    /// First message of the DH tuple protocol.
    Dh {
        /// `a = g^r`
        #[serde(with = "crate::serde::bytes")]
        a: Vec<u8>,
        /// `b = h^r`
        #[serde(with = "crate::serde::bytes")]
        b: Vec<u8>,
    },
    /// Second message of the Pedersen commitment knowledge protocol.
    Pedersen {
        /// `u = alpha + e * x mod q`
        u: BigUint,
        /// `v = beta + e * r mod q`
        v: BigUint,
    },
    /// First message of the Damgård–Jurik product protocol.
    DjProductFirst {
        /// Encryption of the random value `d`.
        a1: BigUint,
        /// `c2^d` with fresh randomness.
        a2: BigUint,
    },
    /// Second message of the Damgård–Jurik product protocol.
    DjProductSecond {
        /// Response in `Z_N`.
        z1: BigUint,
        /// Response in `Z_n^*` for the first ciphertext.
        z2: BigUint,
        /// Response in `Z_n^*` for the third ciphertext.
        z3: BigUint,
    },
    /// Ordered messages of composed or multi-base protocols.
    Multiple(#[serde(deserialize_with = "nested")] Vec<SigmaMessage>),
    /// Second message of the OR composition.
    Or {
        /// Branch challenges `e_0, ..., e_{k-1}`.
        #[serde(with = "crate::serde::bytes_vec")]
        challenges: Vec<Vec<u8>>,
        /// Branch responses `z_0, ..., z_{k-1}`.
        #[serde(deserialize_with = "nested")]
        responses: Vec<SigmaMessage>,
    },
}

impl SigmaMessage {
    /// Returns a human-readable name of the message variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Element(_) => "group element",
            Self::BigInt(_) => "integer",
            Self::Dh { .. } => "DH tuple",
            Self::Pedersen { .. } => "Pedersen response",
            Self::DjProductFirst { .. } => "Damgård–Jurik product commitment",
            Self::DjProductSecond { .. } => "Damgård–Jurik product response",
            Self::Multiple(_) => "multiple messages",
            Self::Or { .. } => "OR response",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ProtocolError {
        ProtocolError::MessageMismatch {
            expected,
            actual: self.kind(),
        }
    }

    pub(crate) fn as_element(&self) -> Result<&[u8], ProtocolError> {
        match self {
            Self::Element(bytes) => Ok(bytes),
            _ => Err(self.mismatch("group element")),
        }
    }

    pub(crate) fn as_big_int(&self) -> Result<&BigUint, ProtocolError> {
        match self {
            Self::BigInt(value) => Ok(value),
            _ => Err(self.mismatch("integer")),
        }
    }

    pub(crate) fn as_dh(&self) -> Result<(&[u8], &[u8]), ProtocolError> {
        match self {
            Self::Dh { a, b } => Ok((a, b)),
            _ => Err(self.mismatch("DH tuple")),
        }
    }

    pub(crate) fn as_pedersen(&self) -> Result<(&BigUint, &BigUint), ProtocolError> {
        match self {
            Self::Pedersen { u, v } => Ok((u, v)),
            _ => Err(self.mismatch("Pedersen response")),
        }
    }

    pub(crate) fn as_dj_product_first(&self) -> Result<(&BigUint, &BigUint), ProtocolError> {
        match self {
            Self::DjProductFirst { a1, a2 } => Ok((a1, a2)),
            _ => Err(self.mismatch("Damgård–Jurik product commitment")),
        }
    }

    pub(crate) fn as_dj_product_second(
        &self,
    ) -> Result<(&BigUint, &BigUint, &BigUint), ProtocolError> {
        match self {
            Self::DjProductSecond { z1, z2, z3 } => Ok((z1, z2, z3)),
            _ => Err(self.mismatch("Damgård–Jurik product response")),
        }
    }

    pub(crate) fn as_multiple(&self) -> Result<&[SigmaMessage], ProtocolError> {
        match self {
            Self::Multiple(messages) => Ok(messages),
            _ => Err(self.mismatch("multiple messages")),
        }
    }

    pub(crate) fn as_or(&self) -> Result<(&[Vec<u8>], &[SigmaMessage]), ProtocolError> {
        match self {
            Self::Or {
                challenges,
                responses,
            } => Ok((challenges, responses)),
            _ => Err(self.mismatch("OR response")),
        }
    }

    /// Encodes this message with `bincode`, the codec used by [channels](crate::Channel).
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        bincode::serialize(self).map_err(|err| ProtocolError::codec("sigma message", err))
    }

    /// Decodes a message encoded with [`Self::to_bytes()`].
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` do not encode a message.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        bincode::deserialize(bytes).map_err(|err| ProtocolError::codec("sigma message", err))
    }
}
