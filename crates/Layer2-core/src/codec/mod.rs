//! Key codec
//!
//! - `schema.rs` - binary layout, shared by encoder and decoder
//! - `token.rs` - printable base64 token around the binary form
//!
//! [`KeyCodec`] binds the layout to a set of [`CodecLimits`]. Nodes sharing a
//! cache should share the limits too; the free functions use the defaults.

mod schema;
mod token;

use sha2::{Digest, Sha256};

use qkey_foundation::{CodecLimits, KeyConfig, Parameter, Result};

use crate::key::{canonicalize, CacheKey, KeyContext, ParamRow};
use schema::{Decoder, Encoder, KeyRecord};

#[derive(Debug, Clone, Default)]
pub struct KeyCodec {
    limits: CodecLimits,
}

impl KeyCodec {
    pub fn new(limits: CodecLimits) -> Self {
        Self { limits }
    }

    pub fn from_config(config: &KeyConfig) -> Self {
        Self::new(config.limits.clone())
    }

    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Binary form of `key`.
    ///
    /// Equal keys always produce identical bytes.
    pub fn encode(&self, key: &CacheKey) -> Result<Vec<u8>> {
        let mut record = KeyRecord {
            fingerprint: key.connection_fingerprint(),
            query: key.query().to_string(),
            parameters: key
                .parameters()
                .iter()
                .map(|p| (p.name().to_string(), p.value().clone()))
                .collect(),
            discriminator: key.discriminator().cloned(),
        };

        let mut encoder = Encoder::new(&self.limits);
        record.schema(&mut encoder)?;
        let bytes = encoder.into_bytes();

        tracing::trace!(bytes = bytes.len(), "Encoded cache key");
        Ok(bytes)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<CacheKey> {
        let mut record = KeyRecord::default();
        let mut decoder = Decoder::new(bytes, &self.limits);
        record.schema(&mut decoder)?;
        decoder.finish()?;

        let decoded: Vec<Parameter> = record
            .parameters
            .into_iter()
            .map(|(name, value)| Parameter::new(name, value))
            .collect();

        // A row that cannot be rebuilt leaves the key without parameters
        // instead of failing the whole decode.
        let row = match ParamRow::try_from_parameters(decoded) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(error = %e, "Decoded parameters do not form a row; using none");
                ParamRow::new()
            }
        };

        tracing::trace!(bytes = bytes.len(), parameters = row.len(), "Decoded cache key");

        Ok(CacheKey::from_parts(
            record.fingerprint,
            record.query,
            canonicalize(&row),
            record.discriminator,
            KeyContext::default(),
        ))
    }

    /// Lowercase hex SHA-256 of the binary form; stable across processes.
    pub fn digest(&self, key: &CacheKey) -> Result<String> {
        let bytes = self.encode(key)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

// ============================================================================
// Free functions (기본 제한)
// ============================================================================

pub fn encode_token(key: &CacheKey) -> Result<String> {
    KeyCodec::default().encode_token(key)
}

pub fn decode_token(token: &str) -> Result<CacheKey> {
    KeyCodec::default().decode_token(token)
}

/// Decode for a cache lookup: any failure is a miss.
pub fn decode_for_lookup(token: &str) -> Option<CacheKey> {
    KeyCodec::default().decode_for_lookup(token)
}

impl CacheKey {
    pub fn to_token(&self) -> Result<String> {
        encode_token(self)
    }

    pub fn from_token(token: &str) -> Result<Self> {
        decode_token(token)
    }

    pub fn digest(&self) -> Result<String> {
        KeyCodec::default().digest(self)
    }
}

impl std::str::FromStr for CacheKey {
    type Err = qkey_foundation::Error;

    fn from_str(s: &str) -> Result<Self> {
        decode_token(s)
    }
}

// ============================================================================
// Serde - 토큰 문자열로 직렬화
// ============================================================================

impl serde::Serialize for CacheKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let token = self.to_token().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&token)
    }
}

impl<'de> serde::Deserialize<'de> for CacheKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = <String as serde::Deserialize>::deserialize(deserializer)?;
        decode_token(&token).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qkey_foundation::{Error, ParamValue};

    fn sample() -> CacheKey {
        let row = ParamRow::new().with("id", 7i64).with("region", "EU");
        CacheKey::new(&42, "SELECT * FROM t WHERE id=:id", &row, None)
    }

    #[test]
    fn test_decode_equals_original() {
        let codec = KeyCodec::default();
        let bytes = codec.encode(&sample()).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(decoded, sample());
        assert_eq!(codec.encode(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_duplicate_names_decode_as_empty() {
        let row = ParamRow::new().with("x", 1i64).with("x", 1i64);
        let key = CacheKey::new(&1, "q", &row, Some(ParamValue::from("csv")));
        assert_eq!(key.parameters().len(), 2);

        let codec = KeyCodec::default();
        let decoded = codec.decode(&codec.encode(&key).unwrap()).unwrap();

        assert!(decoded.parameters().is_empty());
        assert_eq!(decoded.query(), "q");
        assert_eq!(decoded.discriminator(), Some(&ParamValue::from("csv")));
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        let digest = sample().digest().unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let other = CacheKey::new(&43, "SELECT * FROM t WHERE id=:id", &ParamRow::new(), None);
        assert_ne!(digest, other.digest().unwrap());
    }

    #[test]
    fn test_encode_respects_limits() {
        let codec = KeyCodec::new(CodecLimits {
            max_query_bytes: 4,
            ..Default::default()
        });

        assert!(matches!(codec.encode(&sample()), Err(Error::InvalidArgument(_))));
    }
}
