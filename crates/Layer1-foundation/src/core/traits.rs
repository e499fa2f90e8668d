//! Core Traits - 외부 협력자 인터페이스
//!
//! The key only reads from its collaborators: a connection contributes a
//! fingerprint, a parameter row contributes names and values.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::types::ParamValue;
use crate::hash::structural_fingerprint;

// ============================================================================
// Connection
// ============================================================================

/// A data source as seen by the cache key.
///
/// `fingerprint` must be stable for the lifetime of the process. It stands in
/// for the connection's identity; credentials and other internals never
/// reach the key.
pub trait Connection {
    fn fingerprint(&self) -> i32;
}

impl Connection for i32 {
    fn fingerprint(&self) -> i32 {
        *self
    }
}

impl<C: Connection + ?Sized> Connection for &C {
    fn fingerprint(&self) -> i32 {
        (**self).fingerprint()
    }
}

/// Connection identified by the structural hash of a descriptor value
/// (e.g. a data-source name or a settings struct).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashedConnection<T> {
    descriptor: T,
}

impl<T: Hash> HashedConnection<T> {
    pub fn new(descriptor: T) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &T {
        &self.descriptor
    }
}

impl<T: Hash> Connection for HashedConnection<T> {
    fn fingerprint(&self) -> i32 {
        structural_fingerprint(&self.descriptor)
    }
}

// ============================================================================
// ParameterRow
// ============================================================================

/// Name → value lookup with an enumerable set of names.
///
/// `names` may yield the same name twice; callers pass duplicates through
/// unchanged.
pub trait ParameterRow {
    fn names(&self) -> Vec<String>;

    fn get(&self, name: &str) -> Option<ParamValue>;
}

impl<R: ParameterRow + ?Sized> ParameterRow for &R {
    fn names(&self) -> Vec<String> {
        (**self).names()
    }

    fn get(&self, name: &str) -> Option<ParamValue> {
        (**self).get(name)
    }
}

impl ParameterRow for HashMap<String, ParamValue> {
    fn names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<ParamValue> {
        HashMap::get(self, name).cloned()
    }
}

impl ParameterRow for BTreeMap<String, ParamValue> {
    fn names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<ParamValue> {
        BTreeMap::get(self, name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_connection_is_stable() {
        let a = HashedConnection::new("jdbc:postgresql://db/sales");
        let b = HashedConnection::new("jdbc:postgresql://db/sales");
        let c = HashedConnection::new("jdbc:postgresql://db/hr");

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_map_rows() {
        let mut map = HashMap::new();
        map.insert("id".to_string(), ParamValue::Integer(7));

        let row: &dyn ParameterRow = &map;
        assert_eq!(row.names(), vec!["id".to_string()]);
        assert_eq!(row.get("id"), Some(ParamValue::Integer(7)));
        assert_eq!(row.get("missing"), None);
    }
}
