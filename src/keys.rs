//! Cryptographic keys for ElGamal encryption over a [`DlogGroup`].

use num_bigint::BigUint;
use rand_core::CryptoRngCore;

use std::fmt;

use crate::{
    encryption::Ciphertext, group::DlogGroup, input::Witness, secret::SecretExponent,
};

/// Secret key for ElGamal encryption and related protocols. This is a thin wrapper around
/// a [`SecretExponent`].
#[derive(Clone)]
pub struct SecretKey(SecretExponent);

impl fmt::Debug for SecretKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("SecretKey").field(&"_").finish()
    }
}

impl SecretKey {
    /// Wraps the provided exponent. The caller is responsible for reducing it
    /// modulo the group order.
    pub fn new(exponent: SecretExponent) -> Self {
        Self(exponent)
    }

    /// Generates a random secret key.
    pub fn generate<G: DlogGroup>(group: &G, rng: &mut dyn CryptoRngCore) -> Self {
        Self(SecretExponent::new(group.random_exponent(rng)))
    }

    /// Exposes the secret exponent.
    pub fn expose_exponent(&self) -> &BigUint {
        self.0.expose()
    }

    /// Decrypts the provided ciphertext and returns the produced group element.
    ///
    /// As the ciphertext does not include a MAC or another way to assert integrity,
    /// this operation cannot fail. If the ciphertext is not produced properly (e.g., it targets
    /// another receiver), the returned element will be garbage.
    pub fn decrypt<G: DlogGroup>(
        &self,
        group: &G,
        ciphertext: &Ciphertext<G::Element>,
    ) -> G::Element {
        let dh_element = group.exponentiate(ciphertext.random_element(), self.0.expose());
        group.multiply(ciphertext.blinded_element(), &group.invert(&dh_element))
    }

    /// Converts this key into a witness for protocols where the prover knows
    /// the private key (e.g., ElGamal commitment knowledge).
    pub fn to_witness(&self) -> Witness {
        Witness::Exponent(self.0.clone())
    }
}

/// Public key for ElGamal encryption and related protocols.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKey<E> {
    element: E,
}

impl<E: Clone> PublicKey<E> {
    /// Computes the public key corresponding to `secret`.
    pub fn from_secret<G>(group: &G, secret: &SecretKey) -> Self
    where
        G: DlogGroup<Element = E>,
    {
        Self {
            element: group.exponentiate_generator(secret.expose_exponent()),
        }
    }

    /// Wraps a group element. Returns `None` if the element is not a group member
    /// or is the identity.
    pub fn from_element<G>(group: &G, element: E) -> Option<Self>
    where
        G: DlogGroup<Element = E>,
        E: PartialEq,
    {
        let is_valid = group.is_member(&element) && element != group.identity();
        is_valid.then_some(Self { element })
    }

    /// Returns the group element corresponding to this key.
    pub fn as_element(&self) -> &E {
        &self.element
    }
}

/// Keypair for ElGamal encryption and related protocols, consisting of a [`SecretKey`]
/// and the matching [`PublicKey`].
#[derive(Clone)]
pub struct Keypair<E> {
    secret: SecretKey,
    public: PublicKey<E>,
}

impl<E: fmt::Debug> fmt::Debug for Keypair<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Keypair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl<E: Clone> Keypair<E> {
    /// Generates a random keypair.
    pub fn generate<G>(group: &G, rng: &mut dyn CryptoRngCore) -> Self
    where
        G: DlogGroup<Element = E>,
    {
        Self::from_secret(group, SecretKey::generate(group, rng))
    }

    /// Creates a keypair from the secret key.
    pub fn from_secret<G>(group: &G, secret: SecretKey) -> Self
    where
        G: DlogGroup<Element = E>,
    {
        Self {
            public: PublicKey::from_secret(group, &secret),
            secret,
        }
    }

    /// Returns the public part of this keypair.
    pub fn public(&self) -> &PublicKey<E> {
        &self.public
    }

    /// Returns the secret part of this keypair.
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Returns public and secret keys comprising this keypair.
    pub fn into_tuple(self) -> (PublicKey<E>, SecretKey) {
        (self.public, self.secret)
    }
}
