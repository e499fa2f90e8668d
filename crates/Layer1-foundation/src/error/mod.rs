//! Error types for qkey
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// qkey 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 생성 관련
    // ========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ========================================================================
    // 바이너리 디코딩 관련
    // ========================================================================
    #[error("Truncated key: needed {needed} more byte(s), {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Unknown parameter type tag: {0}")]
    UnknownType(u8),

    #[error("Corrupt key: {0}")]
    CorruptKey(String),

    // ========================================================================
    // 토큰 관련
    // ========================================================================
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Failures produced while turning bytes or a token back into a key.
    ///
    /// A cache lookup should treat every one of these as a miss.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Error::Truncated { .. }
                | Error::UnknownType(_)
                | Error::CorruptKey(_)
                | Error::InvalidToken(_)
        )
    }

    /// Truncated 에러 생성 헬퍼
    pub fn truncated(needed: usize, remaining: usize) -> Self {
        Error::Truncated { needed, remaining }
    }

    /// CorruptKey 에러 생성 헬퍼
    pub fn corrupt(message: impl Into<String>) -> Self {
        Error::CorruptKey(message.into())
    }

    /// InvalidArgument 에러 생성 헬퍼
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}
