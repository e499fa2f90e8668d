//! Binary key layout
//!
//! The layout is written down once, as `schema` functions over the [`Field`]
//! visitor. [`Encoder`] and [`Decoder`] both implement `Field`, so a field
//! added to or removed from a schema changes both directions together.
//!
//! ```text
//! i32        connection fingerprint
//! i32 + utf8 query text
//! i32        parameter count
//!   i32 + utf8   name            ┐
//!   u8           type tag        │ per parameter, canonical order
//!   ...          value payload   ┘
//! u8         discriminator present (0/1)
//!   u8 + ...     tagged value    (only when present)
//! ```
//!
//! All integers are big-endian.

use bytes::{Buf, BufMut};
use qkey_foundation::{CodecLimits, Error, ParamType, ParamValue, Result};

// ============================================================================
// Field - 양방향 필드 방문자
// ============================================================================

pub(crate) trait Field: Sized {
    /// True when values are being filled in from bytes.
    const DECODING: bool;

    fn limits(&self) -> &CodecLimits;

    /// Error for a value outside the configured limits.
    fn violation(&self, message: String) -> Error;

    fn u8(&mut self, v: &mut u8) -> Result<()>;
    fn i32(&mut self, v: &mut i32) -> Result<()>;
    fn i64(&mut self, v: &mut i64) -> Result<()>;
    fn f64(&mut self, v: &mut f64) -> Result<()>;
    fn bool(&mut self, v: &mut bool) -> Result<()>;

    /// Length prefix bounded by `max`; returns the length in effect.
    fn length(&mut self, len: usize, max: usize, what: &str) -> Result<usize>;

    fn bytes(&mut self, v: &mut Vec<u8>, max: usize, what: &str) -> Result<()>;
    fn string(&mut self, v: &mut String, max: usize, what: &str) -> Result<()>;

    /// Count-prefixed sequence.
    ///
    /// Decoded elements are pushed as they are read, so a count prefix only
    /// costs memory once the bytes behind it are actually there.
    fn seq<T, F>(&mut self, items: &mut Vec<T>, max: usize, what: &str, mut each: F) -> Result<()>
    where
        T: Default,
        F: FnMut(&mut Self, &mut T) -> Result<()>,
    {
        let len = self.length(items.len(), max, what)?;
        if Self::DECODING {
            items.clear();
            for _ in 0..len {
                let mut item = T::default();
                each(self, &mut item)?;
                items.push(item);
            }
            return Ok(());
        }
        for item in items.iter_mut() {
            each(self, item)?;
        }
        Ok(())
    }
}

// ============================================================================
// Schemas
// ============================================================================

/// Flat form of a key as it appears on the wire.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct KeyRecord {
    pub fingerprint: i32,
    pub query: String,
    pub parameters: Vec<(String, ParamValue)>,
    pub discriminator: Option<ParamValue>,
}

impl KeyRecord {
    pub fn schema<F: Field>(&mut self, f: &mut F) -> Result<()> {
        let limits = f.limits().clone();

        f.i32(&mut self.fingerprint)?;
        f.string(&mut self.query, limits.max_query_bytes, "query text")?;

        f.seq(
            &mut self.parameters,
            limits.max_parameters,
            "parameter count",
            |f, (name, value)| {
                f.string(name, limits.max_string_bytes, "parameter name")?;
                value_schema(f, value, 0)
            },
        )?;

        let mut present = self.discriminator.is_some();
        f.bool(&mut present)?;
        if F::DECODING {
            self.discriminator = present.then(ParamValue::default);
        }
        if let Some(value) = self.discriminator.as_mut() {
            value_schema(f, value, 0)?;
        }

        Ok(())
    }
}

/// Type tag followed by the type-specific payload.
pub(crate) fn value_schema<F: Field>(f: &mut F, value: &mut ParamValue, depth: usize) -> Result<()> {
    let mut code = value.param_type().code();
    f.u8(&mut code)?;
    if F::DECODING {
        *value = ParamValue::empty_of(ParamType::from_code(code)?);
    }

    match value {
        ParamValue::Null => Ok(()),
        ParamValue::String(s) => {
            let max = f.limits().max_string_bytes;
            f.string(s, max, "string value")
        }
        ParamValue::Integer(i) => f.i64(i),
        ParamValue::Numeric(n) => f.f64(n),
        ParamValue::Boolean(b) => f.bool(b),
        ParamValue::Date(millis) => f.i64(millis),
        ParamValue::Array(items) => {
            let limits = f.limits();
            let (max_len, max_depth) = (limits.max_array_len, limits.nesting_depth());
            if depth + 1 > max_depth {
                return Err(f.violation(format!(
                    "array nesting deeper than {} level(s)",
                    max_depth
                )));
            }
            f.seq(items, max_len, "array length", |f, item| {
                value_schema(f, item, depth + 1)
            })
        }
        ParamValue::Opaque(bytes) => {
            let max = f.limits().max_string_bytes;
            f.bytes(bytes, max, "opaque value")
        }
    }
}

// ============================================================================
// Encoder
// ============================================================================

pub(crate) struct Encoder<'a> {
    buf: Vec<u8>,
    limits: &'a CodecLimits,
}

impl<'a> Encoder<'a> {
    pub fn new(limits: &'a CodecLimits) -> Self {
        Self {
            buf: Vec::with_capacity(128),
            limits,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Field for Encoder<'_> {
    const DECODING: bool = false;

    fn limits(&self) -> &CodecLimits {
        self.limits
    }

    fn violation(&self, message: String) -> Error {
        Error::InvalidArgument(format!("key not encodable: {}", message))
    }

    fn u8(&mut self, v: &mut u8) -> Result<()> {
        self.buf.put_u8(*v);
        Ok(())
    }

    fn i32(&mut self, v: &mut i32) -> Result<()> {
        self.buf.put_i32(*v);
        Ok(())
    }

    fn i64(&mut self, v: &mut i64) -> Result<()> {
        self.buf.put_i64(*v);
        Ok(())
    }

    fn f64(&mut self, v: &mut f64) -> Result<()> {
        self.buf.put_u64(ParamValue::numeric_bits(*v));
        Ok(())
    }

    fn bool(&mut self, v: &mut bool) -> Result<()> {
        self.buf.put_u8(u8::from(*v));
        Ok(())
    }

    fn length(&mut self, len: usize, max: usize, what: &str) -> Result<usize> {
        if len > max || len > i32::MAX as usize {
            return Err(self.violation(format!("{} {} exceeds limit {}", what, len, max)));
        }
        self.buf.put_i32(len as i32);
        Ok(len)
    }

    fn bytes(&mut self, v: &mut Vec<u8>, max: usize, what: &str) -> Result<()> {
        self.length(v.len(), max, what)?;
        self.buf.put_slice(v);
        Ok(())
    }

    fn string(&mut self, v: &mut String, max: usize, what: &str) -> Result<()> {
        self.length(v.len(), max, what)?;
        self.buf.put_slice(v.as_bytes());
        Ok(())
    }
}

// ============================================================================
// Decoder
// ============================================================================

pub(crate) struct Decoder<'a> {
    buf: &'a [u8],
    limits: &'a CodecLimits,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8], limits: &'a CodecLimits) -> Self {
        Self { buf, limits }
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(Error::truncated(n, self.buf.remaining()));
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let buf: &'a [u8] = self.buf;
        let (head, tail) = buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Every byte must belong to the record.
    pub fn finish(self) -> Result<()> {
        if self.buf.has_remaining() {
            return Err(Error::corrupt(format!(
                "{} trailing byte(s) after key record",
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}

impl Field for Decoder<'_> {
    const DECODING: bool = true;

    fn limits(&self) -> &CodecLimits {
        self.limits
    }

    fn violation(&self, message: String) -> Error {
        Error::CorruptKey(message)
    }

    fn u8(&mut self, v: &mut u8) -> Result<()> {
        self.need(1)?;
        *v = self.buf.get_u8();
        Ok(())
    }

    fn i32(&mut self, v: &mut i32) -> Result<()> {
        self.need(4)?;
        *v = self.buf.get_i32();
        Ok(())
    }

    fn i64(&mut self, v: &mut i64) -> Result<()> {
        self.need(8)?;
        *v = self.buf.get_i64();
        Ok(())
    }

    fn f64(&mut self, v: &mut f64) -> Result<()> {
        self.need(8)?;
        *v = f64::from_bits(self.buf.get_u64());
        Ok(())
    }

    fn bool(&mut self, v: &mut bool) -> Result<()> {
        self.need(1)?;
        *v = match self.buf.get_u8() {
            0 => false,
            1 => true,
            other => return Err(Error::corrupt(format!("invalid boolean byte {}", other))),
        };
        Ok(())
    }

    fn length(&mut self, _len: usize, max: usize, what: &str) -> Result<usize> {
        let mut raw = 0i32;
        self.i32(&mut raw)?;
        if raw < 0 {
            return Err(Error::corrupt(format!("negative {} {}", what, raw)));
        }
        let len = raw as usize;
        if len > max {
            return Err(self.violation(format!("{} {} exceeds limit {}", what, len, max)));
        }
        Ok(len)
    }

    fn bytes(&mut self, v: &mut Vec<u8>, max: usize, what: &str) -> Result<()> {
        let len = self.length(0, max, what)?;
        *v = self.take(len)?.to_vec();
        Ok(())
    }

    fn string(&mut self, v: &mut String, max: usize, what: &str) -> Result<()> {
        let len = self.length(0, max, what)?;
        let raw = self.take(len)?;
        *v = std::str::from_utf8(raw)
            .map_err(|e| Error::corrupt(format!("{} is not valid UTF-8: {}", what, e)))?
            .to_string();
        Ok(())
    }
}
