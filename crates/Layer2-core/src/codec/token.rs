//! Printable token
//!
//! Standard-alphabet, padded base64 over the binary key form. The token is
//! the only representation meant to leave the process.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use qkey_foundation::{Error, Result};

use super::KeyCodec;
use crate::key::CacheKey;

impl KeyCodec {
    pub fn encode_token(&self, key: &CacheKey) -> Result<String> {
        let bytes = self.encode(key)?;
        Ok(STANDARD.encode(bytes))
    }

    pub fn decode_token(&self, token: &str) -> Result<CacheKey> {
        let max = self.limits().max_token_len;
        if token.len() > max {
            return Err(Error::InvalidToken(format!(
                "token length {} exceeds limit {}",
                token.len(),
                max
            )));
        }

        let bytes = STANDARD
            .decode(token)
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        self.decode(&bytes)
    }

    /// Decode for a cache lookup.
    ///
    /// Every failure is reported as `None` so the caller falls through to a
    /// miss and recomputes the result.
    pub fn decode_for_lookup(&self, token: &str) -> Option<CacheKey> {
        match self.decode_token(token) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(error = %e, "Undecodable cache key token; treating as miss");
                None
            }
        }
    }
}
