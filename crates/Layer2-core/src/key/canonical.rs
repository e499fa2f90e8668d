//! Parameter canonicalization
//!
//! Reads every bound name of a [`ParameterRow`] and orders the result by name
//! using plain ordinal (byte-wise, case-sensitive) comparison. Binding order
//! never survives this step.

use qkey_foundation::{Error, ParamValue, Parameter, ParameterRow, Result};

/// Build the canonical parameter sequence of a row.
///
/// A name whose lookup yields nothing is read as `Null`. The sort is stable,
/// so duplicate names keep the order the row reported them in.
pub fn canonicalize<R: ParameterRow + ?Sized>(row: &R) -> Vec<Parameter> {
    let mut parameters: Vec<Parameter> = row
        .names()
        .into_iter()
        .map(|name| {
            let value = row.get(&name).unwrap_or(ParamValue::Null);
            Parameter::new(name, value)
        })
        .collect();

    sort_canonical(&mut parameters);
    parameters
}

pub(crate) fn sort_canonical(parameters: &mut [Parameter]) {
    parameters.sort_by(|a, b| a.name().as_bytes().cmp(b.name().as_bytes()));
}

// ============================================================================
// ParamRow - 바인딩 순서 그대로의 파라미터 행
// ============================================================================

/// Parameter row in binding order.
///
/// `bind` accepts repeated names the way an upstream row would report them;
/// [`ParamRow::try_from_parameters`] is the strict form used when a row is
/// rebuilt from decoded parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamRow {
    entries: Vec<(String, ParamValue)>,
}

impl ParamRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Rebuild a row from decoded parameters; repeated names are rejected.
    pub fn try_from_parameters<I>(parameters: I) -> Result<Self>
    where
        I: IntoIterator<Item = Parameter>,
    {
        let mut row = Self::new();
        for parameter in parameters {
            if row.contains(parameter.name()) {
                return Err(Error::invalid_argument(format!(
                    "Duplicate parameter name: {}",
                    parameter.name()
                )));
            }
            let (name, value) = parameter.into_parts();
            row.entries.push((name, value));
        }
        Ok(row)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl ParameterRow for ParamRow {
    fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    fn get(&self, name: &str) -> Option<ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}

impl<N: Into<String>, V: Into<ParamValue>> FromIterator<(N, V)> for ParamRow {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (name, value) in iter {
            row.bind(name, value);
        }
        row
    }
}
