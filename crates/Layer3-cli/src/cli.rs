//! Key description ↔ JSON
//!
//! `encode` reads a [`KeySpec`]; `decode` prints [`describe`] output.

use std::collections::BTreeMap;

use qkey_core::{CacheKey, HashedConnection, KeyCodec, ParamValue};
use qkey_foundation::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// JSON description of a key to build
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySpec {
    /// Precomputed connection fingerprint (wins over `connection`)
    #[serde(default)]
    pub fingerprint: Option<i32>,

    /// Connection descriptor, fingerprinted by structural hash
    #[serde(default)]
    pub connection: Option<String>,

    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,

    #[serde(default)]
    pub discriminator: Option<Value>,

    #[serde(default)]
    pub settings_id: Option<String>,

    #[serde(default)]
    pub data_access_id: Option<String>,
}

impl KeySpec {
    pub fn parse(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_key(&self) -> Result<CacheKey> {
        let mut builder = CacheKey::builder();

        if let Some(fingerprint) = self.fingerprint {
            builder = builder.connection(&fingerprint);
        } else if let Some(descriptor) = &self.connection {
            builder = builder.connection(&HashedConnection::new(descriptor.as_str()));
        }

        if let Some(query) = &self.query {
            builder = builder.query(query.as_str());
        }

        if let Some(parameters) = &self.parameters {
            let row = parameters
                .iter()
                .map(|(name, value)| -> Result<(String, ParamValue)> {
                    Ok((name.clone(), ParamValue::from_json(value)?))
                })
                .collect::<Result<BTreeMap<String, ParamValue>>>()?;
            builder = builder.parameters(&row);
        }

        if let Some(discriminator) = &self.discriminator {
            builder = builder.discriminator(ParamValue::from_json(discriminator)?);
        }

        if let Some(id) = &self.settings_id {
            builder = builder.settings_id(id.as_str());
        }
        if let Some(id) = &self.data_access_id {
            builder = builder.data_access_id(id.as_str());
        }

        builder.build()
    }
}

/// Pretty JSON view of a key
pub fn describe(key: &CacheKey, codec: &KeyCodec) -> Result<Value> {
    let parameters: Vec<Value> = key
        .parameters()
        .iter()
        .map(|p| {
            json!({
                "name": p.name(),
                "type": p.param_type().as_str(),
                "value": p.value().to_json(),
            })
        })
        .collect();

    Ok(json!({
        "fingerprint": key.connection_fingerprint(),
        "query": key.query(),
        "parameters": parameters,
        "discriminator": key.discriminator().map(ParamValue::to_json),
        "digest": codec.digest(key)?,
    }))
}

/// Decode two tokens and compare them.
pub fn compare_tokens(codec: &KeyCodec, a: &str, b: &str) -> Result<bool> {
    let left = codec.decode_token(a)?;
    let right = codec.decode_token(b)?;
    Ok(left == right)
}

pub fn require_token(token: &str) -> Result<&str> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::InvalidToken("empty token".to_string()));
    }
    Ok(token)
}
