//! qkey-core: canonical query-result cache keys
//!
//! Layer2 - 키 생성, 정규화, 코덱
//!
//! # 주요 모듈
//!
//! - `key`: CacheKey, 파라미터 정규화 (이름 기준 정렬)
//! - `codec`: 바이너리 레이아웃, base64 토큰, fail-open 디코딩
//!
//! # 사용 예시
//!
//! ```
//! use qkey_core::{CacheKey, ParamRow};
//!
//! let row = ParamRow::new().with("id", 7i64);
//! let key = CacheKey::builder()
//!     .connection(&42)
//!     .query("SELECT * FROM t WHERE id=:id")
//!     .parameters(&row)
//!     .build()?;
//!
//! let token = key.to_token()?;
//! assert_eq!(CacheKey::from_token(&token)?, key);
//! # Ok::<(), qkey_foundation::Error>(())
//! ```

pub mod codec;
pub mod key;

pub use codec::{decode_for_lookup, decode_token, encode_token, KeyCodec};
pub use key::{canonicalize, CacheKey, CacheKeyBuilder, KeyContext, ParamRow};

// Foundation re-exports
pub use qkey_foundation::{
    CodecLimits, Connection, Error, HashedConnection, KeyConfig, ParamType, ParamValue,
    Parameter, ParameterRow, Result,
};
