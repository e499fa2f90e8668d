//! JSON ↔ ParamValue 변환
//!
//! Plain JSON covers null, booleans, strings, numbers and arrays. Dates and
//! opaque bytes use a single-key tagged object:
//!
//! ```text
//! {"$date": "2024-03-01T12:00:00Z"}
//! {"$opaque": "3q2+7w=="}
//! ```
//!
//! A date outside chrono's range is written as `{"$date": <epoch millis>}`,
//! and that form is accepted back.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::types::ParamValue;
use crate::{Error, Result};

const DATE_TAG: &str = "$date";
const OPAQUE_TAG: &str = "$opaque";

impl ParamValue {
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(ParamValue::Null),
            Value::Bool(b) => Ok(ParamValue::Boolean(*b)),
            Value::String(s) => Ok(ParamValue::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ParamValue::Numeric(f))
                } else {
                    Err(Error::invalid_argument(format!("Unsupported number: {}", n)))
                }
            }
            Value::Array(items) => items
                .iter()
                .map(ParamValue::from_json)
                .collect::<Result<Vec<_>>>()
                .map(ParamValue::Array),
            Value::Object(obj) => {
                if obj.len() != 1 {
                    return Err(Error::invalid_argument(
                        "Objects must be a single-key {\"$date\"} or {\"$opaque\"} value",
                    ));
                }

                if let Some(raw) = obj.get(DATE_TAG) {
                    if let Some(millis) = raw.as_i64() {
                        return Ok(ParamValue::Date(millis));
                    }
                    let text = raw.as_str().ok_or_else(|| {
                        Error::invalid_argument("$date must be an RFC 3339 string or epoch millis")
                    })?;
                    let instant = DateTime::parse_from_rfc3339(text)
                        .map_err(|e| Error::invalid_argument(format!("Invalid $date: {}", e)))?;
                    return Ok(ParamValue::date(instant.with_timezone(&Utc)));
                }

                if let Some(raw) = obj.get(OPAQUE_TAG) {
                    let text = raw
                        .as_str()
                        .ok_or_else(|| Error::invalid_argument("$opaque must be a string"))?;
                    let bytes = STANDARD
                        .decode(text)
                        .map_err(|e| Error::invalid_argument(format!("Invalid $opaque: {}", e)))?;
                    return Ok(ParamValue::Opaque(bytes));
                }

                Err(Error::invalid_argument(format!(
                    "Unknown tagged value: {:?}",
                    obj.keys().next()
                )))
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Null => Value::Null,
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Integer(i) => json!(i),
            // NaN and infinities have no JSON form
            ParamValue::Numeric(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
            ParamValue::Boolean(b) => Value::Bool(*b),
            ParamValue::Date(millis) => match self.as_datetime() {
                Some(instant) => {
                    json!({ "$date": instant.to_rfc3339_opts(SecondsFormat::Millis, true) })
                }
                None => json!({ "$date": millis }),
            },
            ParamValue::Array(items) => Value::Array(items.iter().map(ParamValue::to_json).collect()),
            ParamValue::Opaque(bytes) => json!({ "$opaque": STANDARD.encode(bytes) }),
        }
    }
}
