//! Protocol configuration: soundness parameter and explicit group selection.

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::{
    errors::{CheatAttempt, ConfigError},
    group::ZpGroup,
};

/// Soundness parameter `t`: bit length of challenges.
///
/// A cheating prover succeeds with probability at most `2^-t`. The parameter is always
/// a positive multiple of 8, so that challenges are exactly `t / 8` bytes long.
///
/// # Examples
///
/// ```
/// # use elastic_sigma::SoundnessParam;
/// let param = SoundnessParam::new(80)?;
/// assert_eq!(param.byte_len(), 10);
/// assert!(SoundnessParam::new(81).is_err());
/// # Ok::<_, elastic_sigma::ConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SoundnessParam(u32);

impl Default for SoundnessParam {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SoundnessParam {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} bits", self.0)
    }
}

impl SoundnessParam {
    /// Commonly used soundness parameter, 80 bits.
    pub const DEFAULT: Self = Self(80);

    /// Creates a soundness parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if `bits` is zero or is not a multiple of 8.
    pub fn new(bits: u32) -> Result<Self, ConfigError> {
        if bits == 0 || bits % 8 != 0 {
            Err(ConfigError::UnalignedSoundness(bits))
        } else {
            Ok(Self(bits))
        }
    }

    /// Returns the parameter in bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns the challenge length in bytes.
    pub fn byte_len(self) -> usize {
        (self.0 / 8) as usize
    }

    /// Checks the soundness bound `2^t < q` for a group of order `q`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound does not hold (including `2^t == q`).
    pub fn check_order(self, order: &BigUint) -> Result<(), ConfigError> {
        if (BigUint::one() << self.0) < *order {
            Ok(())
        } else {
            Err(ConfigError::SoundnessTooLarge {
                soundness_bits: self.0,
                order_bits: order.bits(),
            })
        }
    }

    /// Checks the bound `3t < |n|` for a Damgård–Jurik modulus `n`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound does not hold.
    pub fn check_modulus(self, modulus: &BigUint) -> Result<(), ConfigError> {
        if 3 * u64::from(self.0) < modulus.bits() {
            Ok(())
        } else {
            Err(ConfigError::SoundnessTooLargeForModulus {
                soundness_bits: self.0,
                modulus_bits: modulus.bits(),
            })
        }
    }

    /// Checks that `challenge` has exactly `t / 8` bytes.
    pub(crate) fn check_challenge(self, challenge: &[u8]) -> Result<(), CheatAttempt> {
        if challenge.len() == self.byte_len() {
            Ok(())
        } else {
            Err(CheatAttempt::ChallengeLength {
                expected: self.byte_len(),
                actual: challenge.len(),
            })
        }
    }
}

impl TryFrom<u32> for SoundnessParam {
    type Error = ConfigError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<SoundnessParam> for u32 {
    fn from(param: SoundnessParam) -> Self {
        param.0
    }
}

/// Well-known `Z_p^*` groups that can be referenced by name in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NamedGroup {
    /// 2048-bit MODP group from RFC 3526.
    #[serde(rename = "rfc3526-2048")]
    Rfc3526Modp2048,
}

/// Configuration of a `Z_p^*` group: either a well-known group or explicit parameters
/// as hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZpGroupConfig {
    /// Well-known group.
    Named(NamedGroup),
    /// Explicit group parameters.
    Explicit {
        /// Hex-encoded modulus.
        p: String,
        /// Hex-encoded subgroup order.
        q: String,
        /// Hex-encoded generator.
        g: String,
    },
}

fn parse_hex(name: &'static str, value: &str) -> Result<BigUint, ConfigError> {
    let value = value.trim();
    let value = value.strip_prefix("0x").unwrap_or(value);
    BigUint::parse_bytes(value.as_bytes(), 16).ok_or(ConfigError::GroupParameter { name })
}

impl TryFrom<&ZpGroupConfig> for ZpGroup {
    type Error = ConfigError;

    fn try_from(config: &ZpGroupConfig) -> Result<Self, Self::Error> {
        match config {
            ZpGroupConfig::Named(NamedGroup::Rfc3526Modp2048) => Ok(Self::rfc3526_2048()),
            ZpGroupConfig::Explicit { p, q, g } => {
                let p = parse_hex("p", p)?;
                let q = parse_hex("q", q)?;
                let g = parse_hex("g", g)?;
                Self::new(p, q, g)
            }
        }
    }
}

/// Configuration of a protocol session.
///
/// There is no implicit group selection: if a `Z_p^*` group is required but not
/// configured, [`Self::zp_group()`] returns an error.
///
/// # Examples
///
/// ```
/// # use elastic_sigma::{DlogGroup, ProtocolConfig};
/// let config: ProtocolConfig = serde_json::from_str(r#"{
///     "soundness_bits": 40,
///     "group": { "p": "7f7", "q": "3fb", "g": "4" }
/// }"#)?;
/// assert_eq!(config.soundness_bits.bits(), 40);
/// let group = config.zp_group()?;
/// assert_eq!(*group.order(), 1019_u32.into());
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Soundness parameter.
    #[serde(default)]
    pub soundness_bits: SoundnessParam,
    /// Configured `Z_p^*` group, if any.
    #[serde(default)]
    pub group: Option<ZpGroupConfig>,
}

impl ProtocolConfig {
    /// Instantiates and validates the configured `Z_p^*` group.
    ///
    /// # Errors
    ///
    /// Returns an error if no group is configured, or if the configured group is invalid.
    pub fn zp_group(&self) -> Result<ZpGroup, ConfigError> {
        let config = self
            .group
            .as_ref()
            .ok_or(ConfigError::InvalidGroup("no Z_p^* group is configured"))?;
        ZpGroup::try_from(config)
    }
}
