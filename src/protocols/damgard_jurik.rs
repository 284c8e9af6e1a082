//! Protocols for Damgård–Jurik ciphertexts.
//!
//! Unlike other protocols in this crate, these do not work in a prime-order group;
//! arithmetic is performed modulo `n`, `N = n^s` and `N' = n^(s + 1)` for the key
//! supplied with the statement. Since the key is a part of the statement, the soundness
//! bound `3t < |n|` is checked for each statement rather than on construction.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand_core::CryptoRngCore;

use super::{
    adapter::{Adapted, InputConversion},
    check_challenge, no_first_message,
};
use crate::{
    challenge::challenge_to_int,
    config::SoundnessParam,
    encryption::{is_unit, mod_inverse, DamgardJurikKey},
    errors::{CheatAttempt, ConfigError, ProtocolError},
    input::{CommonInput, ProverInput, Witness},
    messages::SigmaMessage,
    secret::SecretExponent,
    traits::{
        ChallengeSlot, SigmaProverComputation, SigmaSimulator, SigmaVerifierComputation,
        SimulatedTranscript,
    },
};

/// Moduli derived from a key, with the soundness bound checked.
#[derive(Debug, Clone)]
struct Moduli {
    n: BigUint,
    /// `N = n^s`
    big_n: BigUint,
    /// `N' = n^(s + 1)`
    big_n1: BigUint,
}

impl Moduli {
    fn new(key: &DamgardJurikKey, soundness: SoundnessParam) -> Result<Self, ConfigError> {
        key.check_soundness(soundness)?;
        Ok(Self {
            n: key.modulus().clone(),
            big_n: key.plaintext_modulus(),
            big_n1: key.ciphertext_modulus(),
        })
    }

    /// Computes `(1 + n)^x * r^N mod N'`.
    fn encrypt(&self, plaintext: &BigUint, randomness: &BigUint) -> BigUint {
        let message_part = (&self.n + 1_u32).modpow(plaintext, &self.big_n1);
        message_part * randomness.modpow(&self.big_n, &self.big_n1) % &self.big_n1
    }

    fn random_unit(&self, rng: &mut dyn CryptoRngCore) -> BigUint {
        loop {
            let candidate = rng.gen_biguint_range(&BigUint::one(), &self.n);
            if is_unit(&candidate, &self.n) {
                return candidate;
            }
        }
    }

    fn is_unit(&self, value: &BigUint) -> bool {
        is_unit(value, &self.n)
    }

    /// Computes `value^(-e) mod N'`.
    fn inverse_power(&self, value: &BigUint, e: &BigUint) -> Result<BigUint, ConfigError> {
        let inverse = mod_inverse(value, &self.big_n1).ok_or(ConfigError::InvalidInput(
            "ciphertext is not invertible modulo n^(s + 1)",
        ))?;
        Ok(inverse.modpow(e, &self.big_n1))
    }
}

fn zero_statement<E>(
    input: &CommonInput<E>,
) -> Result<(&DamgardJurikKey, &BigUint), ConfigError> {
    match input {
        CommonInput::DjEncryptedZero { key, ciphertext } => Ok((key, ciphertext)),
        other => Err(other.mismatch("Damgård–Jurik encrypted zero")),
    }
}

#[derive(Debug)]
struct ZeroState {
    moduli: Moduli,
    rho: SecretExponent,
    randomness: SecretExponent,
}

/// Prover computation for the statement that a ciphertext `c = r^N mod N'` encrypts zero.
/// The witness is [`Witness::DjRandomness`] with `r`.
#[derive(Debug)]
pub struct DjEncryptedZeroProver {
    soundness: SoundnessParam,
    state: Option<ZeroState>,
}

impl DjEncryptedZeroProver {
    /// Creates a prover.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self {
            soundness,
            state: None,
        }
    }
}

impl<E> SigmaProverComputation<E> for DjEncryptedZeroProver {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        self.state = None;
        let (key, _) = zero_statement(input.common())?;
        let Witness::DjRandomness(randomness) = input.witness() else {
            return Err(input.witness().mismatch("Damgård–Jurik randomness").into());
        };
        let moduli = Moduli::new(key, self.soundness)?;

        let rho = SecretExponent::new(moduli.random_unit(rng));
        let a = rho.expose().modpow(&moduli.big_n, &moduli.big_n1);
        self.state = Some(ZeroState {
            moduli,
            rho,
            randomness: randomness.clone(),
        });
        Ok(SigmaMessage::BigInt(a))
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        let state = self.state.take().ok_or_else(no_first_message)?;
        check_challenge(self.soundness, challenge)?;

        let e = challenge_to_int(challenge);
        let n = &state.moduli.n;
        let z = state.rho.expose() * state.randomness.expose().modpow(&e, n) % n;
        Ok(SigmaMessage::BigInt(z))
    }

    fn has_pending_state(&self) -> bool {
        self.state.is_some()
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<E>> {
        Box::new(DjEncryptedZeroSimulator::new(self.soundness))
    }
}

/// Verifier computation for Damgård–Jurik encryptions of zero.
/// Checks that `c`, `a` and `z` are coprime with `n`, and that `z^N == a * c^e mod N'`.
#[derive(Debug)]
pub struct DjEncryptedZeroVerifier {
    challenge: ChallengeSlot,
}

impl DjEncryptedZeroVerifier {
    /// Creates a verifier.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self {
            challenge: ChallengeSlot::new(soundness),
        }
    }
}

impl<E> SigmaVerifierComputation<E> for DjEncryptedZeroVerifier {
    fn soundness(&self) -> SoundnessParam {
        self.challenge.soundness()
    }

    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8> {
        self.challenge.sample(rng)
    }

    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt> {
        self.challenge.set(challenge)
    }

    fn challenge(&self) -> Option<&[u8]> {
        self.challenge.get()
    }

    fn reset(&mut self) {
        self.challenge.clear();
    }

    fn verify(
        &mut self,
        input: &CommonInput<E>,
        first: &SigmaMessage,
        second: &SigmaMessage,
    ) -> Result<bool, ProtocolError> {
        let challenge = self.challenge.take()?;
        let (key, ciphertext) = zero_statement(input)?;
        let moduli = Moduli::new(key, self.challenge.soundness())?;
        let a = first.as_big_int()?;
        let z = second.as_big_int()?;

        let e = challenge_to_int(&challenge);
        let units_valid = moduli.is_unit(ciphertext) & moduli.is_unit(a) & moduli.is_unit(z);
        let lhs = z.modpow(&moduli.big_n, &moduli.big_n1);
        let rhs = a * ciphertext.modpow(&e, &moduli.big_n1) % &moduli.big_n1;
        Ok(units_valid & (lhs == rhs))
    }
}

/// Simulator for Damgård–Jurik encryptions of zero.
#[derive(Debug, Clone)]
pub struct DjEncryptedZeroSimulator {
    soundness: SoundnessParam,
}

impl DjEncryptedZeroSimulator {
    /// Creates a simulator.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self { soundness }
    }
}

impl<E> SigmaSimulator<E> for DjEncryptedZeroSimulator {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn simulate_with_challenge(
        &self,
        input: &CommonInput<E>,
        challenge: &[u8],
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError> {
        check_challenge(self.soundness, challenge)?;
        let (key, ciphertext) = zero_statement(input)?;
        let moduli = Moduli::new(key, self.soundness)?;

        let z = moduli.random_unit(rng);
        let e = challenge_to_int(challenge);
        let a = z.modpow(&moduli.big_n, &moduli.big_n1) * moduli.inverse_power(ciphertext, &e)?
            % &moduli.big_n1;
        Ok(SimulatedTranscript {
            first: SigmaMessage::BigInt(a),
            challenge: challenge.to_vec(),
            second: SigmaMessage::BigInt(z),
        })
    }
}

/// Converts the statement that `c` encrypts a public `x` into the statement
/// that `c * (1 + n)^(-x) mod N'` encrypts zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct DjValueConversion;

impl<E> InputConversion<E> for DjValueConversion {
    fn convert_common(&self, input: &CommonInput<E>) -> Result<CommonInput<E>, ConfigError> {
        let CommonInput::DjEncryptedValue {
            key,
            ciphertext,
            plaintext,
        } = input
        else {
            return Err(input.mismatch("Damgård–Jurik encrypted value"));
        };

        // `1 + n` has order `N` in `Z_N'^*`.
        let big_n = key.plaintext_modulus();
        let big_n1 = key.ciphertext_modulus();
        let minus_plaintext = (&big_n - plaintext % &big_n) % &big_n;
        let unmasking = (key.modulus() + 1_u32).modpow(&minus_plaintext, &big_n1);
        Ok(CommonInput::DjEncryptedZero {
            key: key.clone(),
            ciphertext: ciphertext * unmasking % big_n1,
        })
    }
}

/// Prover for the statement that a Damgård–Jurik ciphertext encrypts a public value.
/// The witness is [`Witness::DjRandomness`].
pub type DjEncryptedValueProver = Adapted<DjValueConversion, DjEncryptedZeroProver>;
/// Verifier for the statement that a Damgård–Jurik ciphertext encrypts a public value.
pub type DjEncryptedValueVerifier = Adapted<DjValueConversion, DjEncryptedZeroVerifier>;
/// Simulator for the statement that a Damgård–Jurik ciphertext encrypts a public value.
pub type DjEncryptedValueSimulator = Adapted<DjValueConversion, DjEncryptedZeroSimulator>;

impl DjEncryptedValueProver {
    /// Creates a prover.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self::from_parts(DjValueConversion, DjEncryptedZeroProver::new(soundness))
    }
}

impl DjEncryptedValueVerifier {
    /// Creates a verifier.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self::from_parts(DjValueConversion, DjEncryptedZeroVerifier::new(soundness))
    }
}

impl DjEncryptedValueSimulator {
    /// Creates a simulator.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self::from_parts(DjValueConversion, DjEncryptedZeroSimulator::new(soundness))
    }
}

struct ProductStatement<'a> {
    key: &'a DamgardJurikKey,
    c1: &'a BigUint,
    c2: &'a BigUint,
    c3: &'a BigUint,
}

impl<'a> ProductStatement<'a> {
    fn new<E>(input: &'a CommonInput<E>) -> Result<Self, ConfigError> {
        match input {
            CommonInput::DjProduct { key, c1, c2, c3 } => Ok(Self { key, c1, c2, c3 }),
            other => Err(other.mismatch("Damgård–Jurik product")),
        }
    }
}

#[derive(Debug)]
struct ProductState {
    moduli: Moduli,
    c2: BigUint,
    d: SecretExponent,
    rho: SecretExponent,
    rho_bar: SecretExponent,
    x1: SecretExponent,
    r1: SecretExponent,
    /// `r3 * r2^(-x1) mod n`, the randomness of `c3 / c2^x1`.
    r: SecretExponent,
}

/// Prover computation for the statement that `c3` encrypts the product of plaintexts
/// of `c1` and `c2`, where the prover knows the plaintext `x1` of `c1` and the randomness
/// of all ciphertexts (see [`Witness::DjProduct`]).
///
/// # Algorithm
///
/// The first message is `a1 = Enc(d; rho)`, `a2 = c2^d * rho_bar^N mod N'` for random
/// `d` from `Z_N` and `rho`, `rho_bar` from `Z_n^*`. The second message is
///
/// - `z1 = d + e*x1 mod N`
/// - `z2 = rho * r1^e mod n`
/// - `z3 = rho_bar * (r3 / r2^x1)^e * c2^q mod n`, where `q = (d + e*x1) div N`.
#[derive(Debug)]
pub struct DjProductProver {
    soundness: SoundnessParam,
    state: Option<ProductState>,
}

impl DjProductProver {
    /// Creates a prover.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self {
            soundness,
            state: None,
        }
    }
}

impl<E> SigmaProverComputation<E> for DjProductProver {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn compute_first_message(
        &mut self,
        input: &ProverInput<E>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SigmaMessage, ProtocolError> {
        self.state = None;
        let statement = ProductStatement::new(input.common())?;
        let Witness::DjProduct { x1, r1, r2, r3 } = input.witness() else {
            return Err(input.witness().mismatch("Damgård–Jurik product witness").into());
        };
        let moduli = Moduli::new(statement.key, self.soundness)?;
        let n = &moduli.n;
        let r2_inverse = mod_inverse(r2.expose(), n).ok_or(ConfigError::InvalidInput(
            "ciphertext randomness is not invertible modulo n",
        ))?;
        let r = r3.expose() * r2_inverse.modpow(x1.expose(), n) % n;

        let d = SecretExponent::new(rng.gen_biguint_below(&moduli.big_n));
        let rho = SecretExponent::new(moduli.random_unit(rng));
        let rho_bar = SecretExponent::new(moduli.random_unit(rng));
        let a1 = moduli.encrypt(d.expose(), rho.expose());
        let a2 = statement.c2.modpow(d.expose(), &moduli.big_n1)
            * rho_bar.expose().modpow(&moduli.big_n, &moduli.big_n1)
            % &moduli.big_n1;

        self.state = Some(ProductState {
            c2: statement.c2.clone(),
            moduli,
            d,
            rho,
            rho_bar,
            x1: x1.clone(),
            r1: r1.clone(),
            r: SecretExponent::new(r),
        });
        Ok(SigmaMessage::DjProductFirst { a1, a2 })
    }

    fn compute_second_message(&mut self, challenge: &[u8]) -> Result<SigmaMessage, ProtocolError> {
        let state = self.state.take().ok_or_else(no_first_message)?;
        check_challenge(self.soundness, challenge)?;

        let e = challenge_to_int(challenge);
        let Moduli { n, big_n, .. } = &state.moduli;
        let total = SecretExponent::new(state.d.expose() + &e * state.x1.expose());
        let quotient = SecretExponent::new(total.expose() / big_n);
        let z1 = total.expose() % big_n;
        let z2 = state.rho.expose() * state.r1.expose().modpow(&e, n) % n;
        let z3 = state.rho_bar.expose()
            * state.r.expose().modpow(&e, n)
            * (&state.c2 % n).modpow(quotient.expose(), n)
            % n;
        Ok(SigmaMessage::DjProductSecond { z1, z2, z3 })
    }

    fn has_pending_state(&self) -> bool {
        self.state.is_some()
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn simulator(&self) -> Box<dyn SigmaSimulator<E>> {
        Box::new(DjProductSimulator::new(self.soundness))
    }
}

/// Verifier computation for the Damgård–Jurik product statement.
#[derive(Debug)]
pub struct DjProductVerifier {
    challenge: ChallengeSlot,
}

impl DjProductVerifier {
    /// Creates a verifier.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self {
            challenge: ChallengeSlot::new(soundness),
        }
    }
}

impl<E> SigmaVerifierComputation<E> for DjProductVerifier {
    fn soundness(&self) -> SoundnessParam {
        self.challenge.soundness()
    }

    fn sample_challenge(&mut self, rng: &mut dyn CryptoRngCore) -> Vec<u8> {
        self.challenge.sample(rng)
    }

    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), CheatAttempt> {
        self.challenge.set(challenge)
    }

    fn challenge(&self) -> Option<&[u8]> {
        self.challenge.get()
    }

    fn reset(&mut self) {
        self.challenge.clear();
    }

    fn verify(
        &mut self,
        input: &CommonInput<E>,
        first: &SigmaMessage,
        second: &SigmaMessage,
    ) -> Result<bool, ProtocolError> {
        let challenge = self.challenge.take()?;
        let statement = ProductStatement::new(input)?;
        let moduli = Moduli::new(statement.key, self.challenge.soundness())?;
        let (a1, a2) = first.as_dj_product_first()?;
        let (z1, z2, z3) = second.as_dj_product_second()?;

        let e = challenge_to_int(&challenge);
        let big_n1 = &moduli.big_n1;
        let units_valid = moduli.is_unit(statement.c1)
            & moduli.is_unit(statement.c2)
            & moduli.is_unit(statement.c3)
            & moduli.is_unit(a1)
            & moduli.is_unit(a2)
            & moduli.is_unit(z2)
            & moduli.is_unit(z3);

        let first_lhs = moduli.encrypt(z1, z2);
        let first_rhs = a1 * statement.c1.modpow(&e, big_n1) % big_n1;
        let second_lhs = statement.c2.modpow(z1, big_n1) * z3.modpow(&moduli.big_n, big_n1)
            % big_n1;
        let second_rhs = a2 * statement.c3.modpow(&e, big_n1) % big_n1;
        Ok(units_valid & (first_lhs == first_rhs) & (second_lhs == second_rhs))
    }
}

/// Simulator for the Damgård–Jurik product statement.
#[derive(Debug, Clone)]
pub struct DjProductSimulator {
    soundness: SoundnessParam,
}

impl DjProductSimulator {
    /// Creates a simulator.
    pub fn new(soundness: SoundnessParam) -> Self {
        Self { soundness }
    }
}

impl<E> SigmaSimulator<E> for DjProductSimulator {
    fn soundness(&self) -> SoundnessParam {
        self.soundness
    }

    fn simulate_with_challenge(
        &self,
        input: &CommonInput<E>,
        challenge: &[u8],
        rng: &mut dyn CryptoRngCore,
    ) -> Result<SimulatedTranscript, ProtocolError> {
        check_challenge(self.soundness, challenge)?;
        let statement = ProductStatement::new(input)?;
        let moduli = Moduli::new(statement.key, self.soundness)?;

        let z1 = rng.gen_biguint_below(&moduli.big_n);
        let z2 = moduli.random_unit(rng);
        let z3 = moduli.random_unit(rng);
        let e = challenge_to_int(challenge);
        let big_n1 = &moduli.big_n1;
        let a1 = moduli.encrypt(&z1, &z2) * moduli.inverse_power(statement.c1, &e)? % big_n1;
        let a2 = statement.c2.modpow(&z1, big_n1)
            * z3.modpow(&moduli.big_n, big_n1)
            * moduli.inverse_power(statement.c3, &e)?
            % big_n1;

        Ok(SimulatedTranscript {
            first: SigmaMessage::DjProductFirst { a1, a2 },
            challenge: challenge.to_vec(),
            second: SigmaMessage::DjProductSecond { z1, z2, z3 },
        })
    }
}
