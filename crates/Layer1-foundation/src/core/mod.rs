//! Core Module - 핵심 인터페이스 및 타입
//!
//! ## 타입 계층
//!
//! - `types.rs`: 파라미터 값 모델 (ParamValue, ParamType, Parameter)
//! - `traits.rs`: 외부 협력자 인터페이스 (Connection, ParameterRow)
//! - `json.rs`: JSON ↔ ParamValue 변환

mod json;
mod traits;
mod types;

pub use traits::{Connection, HashedConnection, ParameterRow};
pub use types::{ParamType, ParamValue, Parameter};
