//! Cache key
//!
//! A [`CacheKey`] captures what produced a query result: the connection
//! fingerprint, the exact query text, the canonical parameter sequence and an
//! optional discriminator. Keys are immutable values; equality, hashing and
//! the wire form are all derived from the same canonical parameter sequence.

mod canonical;

pub use canonical::{canonicalize, ParamRow};
pub(crate) use canonical::sort_canonical;

use std::hash::{Hash, Hasher};

use qkey_foundation::{Connection, Error, ParamValue, Parameter, ParameterRow, Result};

// ============================================================================
// KeyContext - 진단용 식별자
// ============================================================================

/// Identifiers carried for logging only.
///
/// They never take part in equality, hashing or encoding; a decoded key has
/// an empty context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyContext {
    pub settings_id: Option<String>,
    pub data_access_id: Option<String>,
}

// ============================================================================
// CacheKey
// ============================================================================

#[derive(Debug, Clone)]
pub struct CacheKey {
    fingerprint: i32,
    query: String,
    /// Canonical (name-sorted) sequence
    parameters: Vec<Parameter>,
    /// Never `Some(ParamValue::Null)`
    discriminator: Option<ParamValue>,
    context: KeyContext,
}

impl CacheKey {
    pub fn builder() -> CacheKeyBuilder {
        CacheKeyBuilder::default()
    }

    /// Construct directly from present inputs.
    pub fn new<C, R>(
        connection: &C,
        query: impl Into<String>,
        row: &R,
        discriminator: Option<ParamValue>,
    ) -> Self
    where
        C: Connection + ?Sized,
        R: ParameterRow + ?Sized,
    {
        Self::from_parts(
            connection.fingerprint(),
            query.into(),
            canonicalize(row),
            discriminator,
            KeyContext::default(),
        )
    }

    pub(crate) fn from_parts(
        fingerprint: i32,
        query: String,
        mut parameters: Vec<Parameter>,
        discriminator: Option<ParamValue>,
        context: KeyContext,
    ) -> Self {
        sort_canonical(&mut parameters);
        Self {
            fingerprint,
            query,
            parameters,
            discriminator: discriminator.filter(|d| !d.is_null()),
            context,
        }
    }

    pub fn connection_fingerprint(&self) -> i32 {
        self.fingerprint
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Canonical parameter sequence
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn discriminator(&self) -> Option<&ParamValue> {
        self.discriminator.as_ref()
    }

    pub fn context(&self) -> &KeyContext {
        &self.context
    }

    /// Row view over the canonical parameters (binding order is not kept).
    pub fn parameter_row(&self) -> ParamRow {
        self.parameters
            .iter()
            .map(|p| (p.name().to_string(), p.value().clone()))
            .collect()
    }

    /// Same key with a different diagnostic context.
    pub fn with_context(mut self, context: KeyContext) -> Self {
        self.context = context;
        self
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
            && self.query == other.query
            && self.parameters == other.parameters
            && self.discriminator == other.discriminator
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state);
        self.query.hash(state);
        state.write_usize(self.parameters.len());
        for parameter in &self.parameters {
            parameter.name().hash(state);
            state.write_u8(parameter.param_type().code());
            parameter.value().hash(state);
        }
        self.discriminator.hash(state);
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`CacheKey`].
///
/// The connection, query text and parameter row are required; `build` fails
/// with `InvalidArgument` naming the first one missing.
#[derive(Debug, Default)]
pub struct CacheKeyBuilder {
    fingerprint: Option<i32>,
    query: Option<String>,
    parameters: Option<Vec<Parameter>>,
    discriminator: Option<ParamValue>,
    context: KeyContext,
}

impl CacheKeyBuilder {
    /// Only the connection's fingerprint is kept.
    pub fn connection<C: Connection + ?Sized>(mut self, connection: &C) -> Self {
        self.fingerprint = Some(connection.fingerprint());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Reads and canonicalizes the row immediately.
    pub fn parameters<R: ParameterRow + ?Sized>(mut self, row: &R) -> Self {
        self.parameters = Some(canonicalize(row));
        self
    }

    pub fn discriminator(mut self, discriminator: impl Into<ParamValue>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn settings_id(mut self, id: impl Into<String>) -> Self {
        self.context.settings_id = Some(id.into());
        self
    }

    pub fn data_access_id(mut self, id: impl Into<String>) -> Self {
        self.context.data_access_id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<CacheKey> {
        let fingerprint = self
            .fingerprint
            .ok_or_else(|| Error::invalid_argument("connection is required"))?;
        let query = self
            .query
            .ok_or_else(|| Error::invalid_argument("query text is required"))?;
        let parameters = self
            .parameters
            .ok_or_else(|| Error::invalid_argument("parameter row is required"))?;

        let key = CacheKey::from_parts(
            fingerprint,
            query,
            parameters,
            self.discriminator,
            self.context,
        );

        tracing::debug!(
            settings_id = ?key.context.settings_id,
            data_access_id = ?key.context.data_access_id,
            fingerprint = key.fingerprint,
            parameters = key.parameters.len(),
            "Built cache key"
        );

        Ok(key)
    }
}
