//! # qkey-foundation
//!
//! Foundation layer for qkey:
//! - Core: 파라미터 값 모델과 협력자 Trait (Connection, ParameterRow)
//! - Config: 코덱 크기 제한 (KeyConfig, CodecLimits)
//! - Error: 공용 에러 타입
//! - Hash: 구조적 해시 / 연결 fingerprint
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Connection ──fingerprint──┐                            │
//! │  ParameterRow ──names/get──┼──▶ CacheKey (qkey-core)     │
//! │  ParamValue (closed enum) ─┘        │                   │
//! │                                     ▼                   │
//! │                       binary layout ─▶ base64 token      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod hash;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (핵심 Trait 및 타입)
// ============================================================================
pub use core::{
    // Traits (traits.rs)
    Connection,
    HashedConnection,
    ParameterRow,
    // Types (types.rs)
    ParamType,
    ParamValue,
    Parameter,
};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{CodecLimits, KeyConfig, MAX_NESTING_DEPTH_CEILING, QKEY_CONFIG_FILE};

// ============================================================================
// Hash (해시 유틸리티)
// ============================================================================
pub use hash::{compute_hash, fold_to_i32, structural_fingerprint};
