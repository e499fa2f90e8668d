//! Codec Limits - 키 인코딩/디코딩 크기 제한
//!
//! The encoder and the decoder apply the same limits, so every key that can be
//! encoded can also be decoded by a peer sharing the configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hard ceiling on array nesting; decoding recurses once per level
pub const MAX_NESTING_DEPTH_CEILING: usize = 64;

/// Size limits for the binary key layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecLimits {
    /// Maximum UTF-8 byte length of the query text
    #[serde(default = "default_max_query_bytes")]
    pub max_query_bytes: usize,

    /// Maximum byte length of a parameter name, string value or opaque value
    #[serde(default = "default_max_string_bytes")]
    pub max_string_bytes: usize,

    /// Maximum number of bound parameters
    #[serde(default = "default_max_parameters")]
    pub max_parameters: usize,

    /// Maximum number of elements in one array value
    #[serde(default = "default_max_array_len")]
    pub max_array_len: usize,

    /// Maximum array nesting depth (a flat array is depth 1)
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    /// Maximum length of a printable token, checked before base64 decoding
    #[serde(default = "default_max_token_len")]
    pub max_token_len: usize,
}

fn default_max_query_bytes() -> usize {
    1024 * 1024
} // 1 MiB
fn default_max_string_bytes() -> usize {
    1024 * 1024
} // 1 MiB
fn default_max_parameters() -> usize {
    4096
}
fn default_max_array_len() -> usize {
    65_536
}
fn default_max_nesting_depth() -> usize {
    16
}
fn default_max_token_len() -> usize {
    16 * 1024 * 1024
} // 16 MiB

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_query_bytes: default_max_query_bytes(),
            max_string_bytes: default_max_string_bytes(),
            max_parameters: default_max_parameters(),
            max_array_len: default_max_array_len(),
            max_nesting_depth: default_max_nesting_depth(),
            max_token_len: default_max_token_len(),
        }
    }
}

impl CodecLimits {
    /// Tight limits for nodes that only exchange small keys
    pub fn compact() -> Self {
        Self {
            max_query_bytes: 64 * 1024,
            max_string_bytes: 64 * 1024,
            max_parameters: 256,
            max_array_len: 1024,
            max_nesting_depth: 4,
            max_token_len: 1024 * 1024,
        }
    }

    /// Nesting depth in effect, never above [`MAX_NESTING_DEPTH_CEILING`]
    pub fn nesting_depth(&self) -> usize {
        self.max_nesting_depth.min(MAX_NESTING_DEPTH_CEILING)
    }

    /// 설정 값 검증
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_query_bytes", self.max_query_bytes),
            ("max_string_bytes", self.max_string_bytes),
            ("max_parameters", self.max_parameters),
            ("max_array_len", self.max_array_len),
            ("max_nesting_depth", self.max_nesting_depth),
            ("max_token_len", self.max_token_len),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than zero", name)));
            }
            if value > i32::MAX as usize {
                return Err(Error::Config(format!(
                    "{} exceeds the 32-bit length prefix range",
                    name
                )));
            }
        }

        if self.max_nesting_depth > MAX_NESTING_DEPTH_CEILING {
            return Err(Error::Config(format!(
                "max_nesting_depth {} exceeds the ceiling of {}",
                self.max_nesting_depth, MAX_NESTING_DEPTH_CEILING
            )));
        }

        Ok(())
    }
}
