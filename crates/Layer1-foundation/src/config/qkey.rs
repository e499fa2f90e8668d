//! qkey Config - 통합 설정
//!
//! TOML 또는 JSON 파일에서 로드

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::CodecLimits;

/// 기본 설정 파일명
pub const QKEY_CONFIG_FILE: &str = "qkey.toml";

// ============================================================================
// qkey Config (통합)
// ============================================================================

/// qkey 통합 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 코덱 크기 제한
    #[serde(default)]
    pub limits: CodecLimits,
}

fn default_version() -> u32 {
    1
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyConfig {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            limits: CodecLimits::default(),
        }
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 파일에서 로드 (`.json` 확장자는 JSON, 그 외는 TOML)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        tracing::debug!(path = %path.display(), "Loaded qkey config");
        Ok(config)
    }

    /// 파일이 없으면 기본값
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: KeyConfig = toml::from_str(content)?;
        config.limits.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: KeyConfig = serde_json::from_str(content)?;
        config.limits.validate()?;
        Ok(config)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = KeyConfig::from_toml_str(
            r#"
            [limits]
            max_parameters = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.version, 1);
        assert_eq!(config.limits.max_parameters, 12);
        assert_eq!(
            config.limits.max_query_bytes,
            CodecLimits::default().max_query_bytes
        );
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let err = KeyConfig::from_toml_str("[limits]\nmax_nesting_depth = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"limits": {{"max_array_len": 8}}}}"#).unwrap();

        let config = KeyConfig::load(file.path()).unwrap();
        assert_eq!(config.limits.max_array_len, 8);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "version = 1\n[limits]\nmax_token_len = 4096").unwrap();

        let config = KeyConfig::load(file.path()).unwrap();
        assert_eq!(config.limits.max_token_len, 4096);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KeyConfig::load(dir.path().join(QKEY_CONFIG_FILE)).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = KeyConfig::load_or_default(dir.path().join(QKEY_CONFIG_FILE)).unwrap();
        assert_eq!(config, KeyConfig::new());
    }
}
