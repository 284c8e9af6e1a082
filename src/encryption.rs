//! Ciphertexts and commitments used as statements of sigma protocols.
//!
//! - [`Ciphertext`] is an ElGamal ciphertext over any [`DlogGroup`].
//! - [`PedersenCommitment`] is a commitment `c = g^r * h^x` over any [`DlogGroup`].
//! - [`DamgardJurikKey`] is a public key of the Damgård–Jurik cryptosystem, a generalization
//!   of Paillier encryption working modulo `n^(s + 1)`.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::{
    config::SoundnessParam,
    errors::ConfigError,
    group::DlogGroup,
    input::{CommonInput, ElGamalWitnessKind, ProverInput, Witness},
    keys::PublicKey,
    protocols::pedersen_commit,
    secret::SecretExponent,
};

/// ElGamal ciphertext `(c1, c2) = (g^r, value * h^r)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ciphertext<E> {
    random_element: E,
    blinded_element: E,
}

impl<E: Clone> Ciphertext<E> {
    /// Encrypts `value` for `receiver`. Returns the ciphertext together with the randomness
    /// used, which serves as a witness in proofs concerning the ciphertext.
    pub fn new<G>(
        group: &G,
        value: &E,
        receiver: &PublicKey<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> (Self, SecretExponent)
    where
        G: DlogGroup<Element = E>,
    {
        let randomness = SecretExponent::new(group.random_exponent(rng));
        let ciphertext = Self::with_randomness(group, value, receiver, randomness.expose());
        (ciphertext, randomness)
    }

    /// Encrypts `value` for `receiver` using the specified randomness.
    pub fn with_randomness<G>(
        group: &G,
        value: &E,
        receiver: &PublicKey<E>,
        randomness: &BigUint,
    ) -> Self
    where
        G: DlogGroup<Element = E>,
    {
        let blinding = group.exponentiate(receiver.as_element(), randomness);
        Self {
            random_element: group.exponentiate_generator(randomness),
            blinded_element: group.multiply(value, &blinding),
        }
    }

    /// Returns the random element `c1 = g^r`.
    pub fn random_element(&self) -> &E {
        &self.random_element
    }

    /// Returns the blinded element `c2 = value * h^r`.
    pub fn blinded_element(&self) -> &E {
        &self.blinded_element
    }

    /// Creates a statement that this ciphertext commits to `value` under `receiver`.
    pub fn committed_value_statement(&self, receiver: &PublicKey<E>, value: E) -> CommonInput<E> {
        CommonInput::ElGamalCommittedValue {
            public_key: receiver.as_element().clone(),
            c1: self.random_element.clone(),
            c2: self.blinded_element.clone(),
            value,
        }
    }

    /// Creates a statement that this ciphertext encrypts `value` for `receiver`.
    pub fn encrypted_value_statement(
        &self,
        receiver: &PublicKey<E>,
        value: E,
        witness: ElGamalWitnessKind,
    ) -> CommonInput<E> {
        CommonInput::ElGamalEncryptedValue {
            public_key: receiver.as_element().clone(),
            c1: self.random_element.clone(),
            c2: self.blinded_element.clone(),
            value,
            witness,
        }
    }
}

/// Pedersen commitment `c = g^r * h^x` together with its opening.
#[derive(Debug, Clone)]
pub struct PedersenCommitment<E> {
    key: E,
    commitment: E,
    value: SecretExponent,
    randomness: SecretExponent,
}

impl<E: Clone> PedersenCommitment<E> {
    /// Commits to `value` using the commitment key `h` and fresh randomness.
    pub fn new<G>(group: &G, key: E, value: &BigUint, rng: &mut dyn CryptoRngCore) -> Self
    where
        G: DlogGroup<Element = E>,
    {
        let randomness = SecretExponent::new(group.random_exponent(rng));
        let value = SecretExponent::new(value % group.order());
        let commitment = pedersen_commit(group, &key, value.expose(), randomness.expose());
        Self {
            key,
            commitment,
            value,
            randomness,
        }
    }

    /// Returns the commitment element `c`.
    pub fn commitment(&self) -> &E {
        &self.commitment
    }

    /// Returns the randomness `r` of the commitment.
    pub fn randomness(&self) -> &SecretExponent {
        &self.randomness
    }

    /// Creates a prover input for the knowledge of the commitment opening.
    pub fn knowledge_input(&self) -> ProverInput<E> {
        let common = CommonInput::PedersenKnowledge {
            h: self.key.clone(),
            commitment: self.commitment.clone(),
        };
        let witness = Witness::Pedersen {
            value: self.value.clone(),
            randomness: self.randomness.clone(),
        };
        ProverInput::new(common, witness)
    }

    /// Creates a prover input for the knowledge of the randomness, revealing the committed value.
    pub fn committed_value_input(&self) -> ProverInput<E> {
        let common = CommonInput::PedersenCommittedValue {
            h: self.key.clone(),
            commitment: self.commitment.clone(),
            value: self.value.expose().clone(),
        };
        ProverInput::new(common, Witness::Exponent(self.randomness.clone()))
    }
}

/// Public key of the Damgård–Jurik cryptosystem: an RSA modulus `n` and the length
/// parameter `s >= 1`.
///
/// Plaintexts are elements of `Z_N` with `N = n^s`, and ciphertexts are elements
/// of `Z_N'^*` with `N' = n^(s + 1)`. Encryption is `Enc(x; r) = (1 + n)^x * r^N mod N'`
/// for `r` from `Z_n^*`.
///
/// Deserialization performs the same checks as [`Self::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DamgardJurikKeyRepr")]
pub struct DamgardJurikKey {
    n: BigUint,
    s: u32,
}

#[derive(Deserialize)]
struct DamgardJurikKeyRepr {
    n: BigUint,
    s: u32,
}

impl TryFrom<DamgardJurikKeyRepr> for DamgardJurikKey {
    type Error = ConfigError;

    fn try_from(repr: DamgardJurikKeyRepr) -> Result<Self, Self::Error> {
        Self::new(repr.n, repr.s)
    }
}

impl DamgardJurikKey {
    /// Creates a key from the modulus `n` and the length parameter `s`.
    ///
    /// # Errors
    ///
    /// Returns an error if `s == 0` or `s == u32::MAX`, or if `n` is not an odd number
    /// greater than 3.
    pub fn new(n: BigUint, s: u32) -> Result<Self, ConfigError> {
        if s == 0 {
            return Err(ConfigError::InvalidInput(
                "Damgård–Jurik length parameter must be positive",
            ));
        }
        if s == u32::MAX {
            return Err(ConfigError::InvalidInput(
                "Damgård–Jurik length parameter is too large",
            ));
        }
        if n <= BigUint::from(3_u32) || n.is_even() {
            return Err(ConfigError::InvalidInput(
                "Damgård–Jurik modulus must be an odd number greater than 3",
            ));
        }
        Ok(Self { n, s })
    }

    /// Creates a key from two distinct primes.
    ///
    /// # Errors
    ///
    /// Returns an error if `p` or `q` is not an odd prime, or if `p == q`.
    pub fn from_primes(p: &BigUint, q: &BigUint, s: u32) -> Result<Self, ConfigError> {
        let primes_are_valid = p != q
            && p.is_odd()
            && q.is_odd()
            && crate::group::is_probable_prime(p)
            && crate::group::is_probable_prime(q);
        if !primes_are_valid {
            return Err(ConfigError::InvalidInput(
                "Damgård–Jurik primes must be distinct odd primes",
            ));
        }
        Self::new(p * q, s)
    }

    /// Returns the modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// Returns the length parameter `s`.
    pub fn length(&self) -> u32 {
        self.s
    }

    /// Returns `N = n^s`, the plaintext modulus.
    pub fn plaintext_modulus(&self) -> BigUint {
        self.n.pow(self.s)
    }

    /// Returns `N' = n^(s + 1)`, the ciphertext modulus.
    pub fn ciphertext_modulus(&self) -> BigUint {
        self.n.pow(self.s + 1)
    }

    /// Checks that the modulus is long enough for the soundness parameter (`3t < |n|`).
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    pub fn check_soundness(&self, soundness: SoundnessParam) -> Result<(), ConfigError> {
        soundness.check_modulus(&self.n)
    }

    /// Samples a uniformly random element of `Z_n^*`.
    pub fn random_unit(&self, rng: &mut dyn CryptoRngCore) -> BigUint {
        loop {
            let candidate = rng.gen_biguint_range(&BigUint::one(), &self.n);
            if candidate.gcd(&self.n).is_one() {
                return candidate;
            }
        }
    }

    /// Encrypts `plaintext` using the specified randomness `r`.
    pub fn encrypt_with_randomness(&self, plaintext: &BigUint, randomness: &BigUint) -> BigUint {
        let big_n = self.plaintext_modulus();
        let big_n1 = self.ciphertext_modulus();
        let message_part = (&self.n + 1_u32).modpow(plaintext, &big_n1);
        let random_part = randomness.modpow(&big_n, &big_n1);
        message_part * random_part % big_n1
    }

    /// Encrypts `plaintext` using fresh randomness. Returns the ciphertext together with
    /// the randomness.
    pub fn encrypt(
        &self,
        plaintext: &BigUint,
        rng: &mut dyn CryptoRngCore,
    ) -> (BigUint, SecretExponent) {
        let randomness = SecretExponent::new(self.random_unit(rng));
        let ciphertext = self.encrypt_with_randomness(plaintext, randomness.expose());
        (ciphertext, randomness)
    }
}

/// Computes the inverse of `value` modulo `modulus`, if it exists.
pub(crate) fn mod_inverse(value: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    if modulus.is_zero() {
        return None;
    }
    let value = BigInt::from(value % modulus);
    let modulus = BigInt::from(modulus.clone());
    let gcd = value.extended_gcd(&modulus);
    if !gcd.gcd.is_one() {
        return None;
    }
    gcd.x.mod_floor(&modulus).to_biguint()
}

/// Checks whether `value` is coprime with `modulus`.
pub(crate) fn is_unit(value: &BigUint, modulus: &BigUint) -> bool {
    !value.is_zero() && value.gcd(modulus).is_one()
}
