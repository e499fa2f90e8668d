//! Config - 통합 설정 관리
//!
//! - `limits.rs` - 코덱 크기 제한
//! - `qkey.rs` - KeyConfig 통합 설정

mod limits;
mod qkey;

pub use limits::{CodecLimits, MAX_NESTING_DEPTH_CEILING};
pub use qkey::{KeyConfig, QKEY_CONFIG_FILE};
