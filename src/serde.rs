//! (De)serialization utils.
//!
//! Byte buffers (serialized group elements, challenges) are encoded as base64url strings
//! without padding in human-readable formats, and as raw bytes otherwise.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{
    de::{Error as DeError, Unexpected, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use std::fmt;

pub(crate) fn serialize_bytes<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&Base64UrlUnpadded::encode_string(value))
    } else {
        serializer.serialize_bytes(value)
    }
}

pub(crate) fn deserialize_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Base64Visitor;

    impl Visitor<'_> for Base64Visitor {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("base64url-encoded data")
        }

        fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
            Base64UrlUnpadded::decode_vec(value)
                .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
        }

        fn visit_bytes<E: DeError>(self, value: &[u8]) -> Result<Self::Value, E> {
            Ok(value.to_vec())
        }

        fn visit_byte_buf<E: DeError>(self, value: Vec<u8>) -> Result<Self::Value, E> {
            Ok(value)
        }
    }

    struct BytesVisitor;

    impl Visitor<'_> for BytesVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("byte buffer")
        }

        fn visit_bytes<E: DeError>(self, value: &[u8]) -> Result<Self::Value, E> {
            Ok(value.to_vec())
        }

        fn visit_byte_buf<E: DeError>(self, value: Vec<u8>) -> Result<Self::Value, E> {
            Ok(value)
        }
    }

    if deserializer.is_human_readable() {
        deserializer.deserialize_str(Base64Visitor)
    } else {
        deserializer.deserialize_byte_buf(BytesVisitor)
    }
}

/// Helper for `#[serde(with)]` on a single byte buffer.
pub(crate) mod bytes {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize_bytes(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        super::deserialize_bytes(deserializer)
    }
}

struct EncodedBytes<'a>(&'a [u8]);

impl Serialize for EncodedBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_bytes(self.0, serializer)
    }
}

struct DecodedBytes(Vec<u8>);

impl<'de> Deserialize<'de> for DecodedBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_bytes(deserializer).map(Self)
    }
}

/// Helper for `#[serde(with)]` on a sequence of byte buffers.
pub(crate) mod bytes_vec {
    use serde::{ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    use super::{DecodedBytes, EncodedBytes};

    pub fn serialize<S: Serializer>(value: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for bytes in value {
            seq.serialize_element(&EncodedBytes(bytes))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let decoded = Vec::<DecodedBytes>::deserialize(deserializer)?;
        Ok(decoded.into_iter().map(|bytes| bytes.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::bytes")]
        single: Vec<u8>,
        #[serde(with = "super::bytes_vec")]
        many: Vec<Vec<u8>>,
    }

    fn sample() -> Sample {
        Sample {
            single: vec![0xfb, 0xff],
            many: vec![vec![], vec![1, 2, 3]],
        }
    }

    #[test]
    fn human_readable_encoding() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "single": "-_8", "many": ["", "AQID"] })
        );
        let restored: Sample = serde_json::from_value(json).unwrap();
        assert_eq!(restored, sample());
    }

    #[test]
    fn binary_encoding() {
        let bytes = bincode::serialize(&sample()).unwrap();
        // `single`: 8-byte length prefix + 2 bytes; `many`: 8 + (8 + 0) + (8 + 3) bytes.
        assert_eq!(bytes.len(), 37);
        let restored: Sample = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, sample());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let json = serde_json::json!({ "single": "!!", "many": [] });
        let err = serde_json::from_value::<Sample>(json).unwrap_err().to_string();
        assert!(err.contains("base64url"), "{err}");
    }
}
