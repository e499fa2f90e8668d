//! CacheKey 통합 테스트 - 정규화, 동등성/해시, 토큰 왕복
//!
//! `cargo test -p qkey-core --test key_properties`

use std::collections::{BTreeMap, HashMap};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{TimeZone, Utc};
use qkey_core::{
    decode_for_lookup, decode_token, encode_token, CacheKey, Error, HashedConnection, KeyCodec,
    ParamRow, ParamValue,
};
use qkey_foundation::compute_hash;

const QUERY: &str = "SELECT * FROM t WHERE id=:id";

fn build(fingerprint: i32, query: &str, row: &ParamRow) -> CacheKey {
    CacheKey::builder()
        .connection(&fingerprint)
        .query(query)
        .parameters(row)
        .build()
        .expect("build failed")
}

/// Rows covering every value type, nesting and an empty row
fn sample_rows() -> Vec<ParamRow> {
    let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

    vec![
        ParamRow::new(),
        ParamRow::new().with("id", 7i64),
        ParamRow::new()
            .with("name", "Ωmega")
            .with("ratio", 0.25)
            .with("flag", false)
            .with("since", instant)
            .with("nothing", ParamValue::Null),
        ParamRow::new()
            .with("ids", vec![1i64, 2, 3])
            .with("matrix", ParamValue::Array(vec![ParamValue::from(vec!["a"]), ParamValue::Null]))
            .with("blob", ParamValue::Opaque(vec![0, 255, 128])),
        ParamRow::new().with("Zeta", 1i64).with("alpha", 2i64).with("_x", 3i64),
    ]
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_round_trip() {
    let key = build(42, QUERY, &ParamRow::new().with("id", 7i64));

    let token = encode_token(&key).unwrap();
    let decoded = decode_token(&token).unwrap();

    assert_eq!(decoded, key);
    assert_eq!(encode_token(&decoded).unwrap(), token);
}

#[test]
fn test_scenario_b_binding_order() {
    let forward = ParamRow::new().with("id", 7i64).with("region", "EU").with("active", true);
    let backward = ParamRow::new().with("active", true).with("region", "EU").with("id", 7i64);

    let a = build(42, QUERY, &forward);
    let b = build(42, QUERY, &backward);

    assert_eq!(a, b);
    assert_eq!(encode_token(&a).unwrap(), encode_token(&b).unwrap());
}

#[test]
fn test_scenario_c_null_discriminator() {
    let row = ParamRow::new().with("id", 7i64);
    let absent = build(42, QUERY, &row);
    let null = CacheKey::builder()
        .connection(&42)
        .query(QUERY)
        .parameters(&row)
        .discriminator(ParamValue::Null)
        .build()
        .unwrap();

    assert_eq!(absent, null);
    assert_eq!(compute_hash(&absent), compute_hash(&null));
    assert_eq!(encode_token(&absent).unwrap(), encode_token(&null).unwrap());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_round_trip_stability() {
    for row in sample_rows() {
        for discriminator in [None, Some(ParamValue::from("csv")), Some(ParamValue::Integer(3))] {
            let key = CacheKey::new(&-17, QUERY, &row, discriminator);

            let token = encode_token(&key).unwrap();
            let decoded = decode_token(&token).unwrap();

            assert_eq!(decoded, key, "row {:?}", row);
            assert_eq!(encode_token(&decoded).unwrap(), token);
        }
    }
}

#[test]
fn test_order_independence_all_permutations() {
    let entries = [
        ("c", ParamValue::from("x")),
        ("a", ParamValue::Integer(1)),
        ("b", ParamValue::Boolean(true)),
        ("A", ParamValue::Numeric(1.5)),
    ];
    let reference_row: ParamRow = entries.iter().cloned().collect();
    let reference = build(1, QUERY, &reference_row);
    let reference_token = encode_token(&reference).unwrap();

    let n = entries.len();
    for perm in permutations(n) {
        let row: ParamRow = perm.iter().map(|&i| entries[i].clone()).collect();
        let key = build(1, QUERY, &row);

        assert_eq!(key, reference);
        assert_eq!(compute_hash(&key), compute_hash(&reference));
        assert_eq!(encode_token(&key).unwrap(), reference_token);
    }
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![vec![]];
    }
    let mut out = Vec::new();
    for rest in permutations(n - 1) {
        for pos in 0..=rest.len() {
            let mut p = rest.clone();
            p.insert(pos, n - 1);
            out.push(p);
        }
    }
    out
}

#[test]
fn test_discriminating_power() {
    let row = ParamRow::new().with("id", 7i64);
    let base = build(42, QUERY, &row);

    assert_ne!(base, build(42, "SELECT * FROM t WHERE id = :id", &row));
    assert_ne!(base, build(41, QUERY, &row));
    assert_ne!(base, build(42, QUERY, &ParamRow::new().with("id", 8i64)));
    // same digits, different type
    assert_ne!(base, build(42, QUERY, &ParamRow::new().with("id", "7")));
    assert_ne!(base, build(42, QUERY, &ParamRow::new().with("Id", 7i64)));

    assert_ne!(encode_token(&base).unwrap(), encode_token(&build(41, QUERY, &row)).unwrap());
}

#[test]
fn test_hash_agrees_with_equality() {
    let mut store: HashMap<CacheKey, &str> = HashMap::new();

    for (i, row) in sample_rows().into_iter().enumerate() {
        let key = build(i as i32, QUERY, &row);
        store.insert(key, "cached");
    }

    // Equal keys from other sources must hit the same entries
    for (i, row) in sample_rows().into_iter().enumerate() {
        let mut entries: Vec<(String, ParamValue)> =
            row.iter().map(|(n, v)| (n.to_string(), v.clone())).collect();
        entries.reverse();
        let reversed: ParamRow = entries.into_iter().collect();
        let rebuilt = build(i as i32, QUERY, &reversed);
        let decoded = decode_token(&encode_token(&rebuilt).unwrap()).unwrap();

        assert_eq!(compute_hash(&rebuilt), compute_hash(&decoded));
        assert_eq!(store.get(&rebuilt), Some(&"cached"));
        assert_eq!(store.get(&decoded), Some(&"cached"));
    }
}

#[test]
fn test_map_rows_match_param_row() {
    let mut hash_map = HashMap::new();
    hash_map.insert("b".to_string(), ParamValue::from("x"));
    hash_map.insert("a".to_string(), ParamValue::Integer(1));

    let btree: BTreeMap<String, ParamValue> = hash_map.clone().into_iter().collect();
    let row = ParamRow::new().with("a", 1i64).with("b", "x");

    let from_hash = CacheKey::new(&5, QUERY, &hash_map, None);
    let from_btree = CacheKey::new(&5, QUERY, &btree, None);
    let from_row = CacheKey::new(&5, QUERY, &row, None);

    assert_eq!(from_hash, from_row);
    assert_eq!(from_btree, from_row);
}

#[test]
fn test_hashed_connection_fingerprint() {
    let conn = HashedConnection::new(("postgres", "db.internal", 5432));
    let row = ParamRow::new();

    let a = CacheKey::builder().connection(&conn).query(QUERY).parameters(&row).build().unwrap();
    let b = CacheKey::builder()
        .connection(&HashedConnection::new(("postgres", "db.internal", 5432)))
        .query(QUERY)
        .parameters(&row)
        .build()
        .unwrap();

    assert_eq!(a, b);

    let other = HashedConnection::new(("postgres", "db.internal", 5433));
    assert_ne!(a, CacheKey::new(&other, QUERY, &row, None));
}

// ============================================================================
// Corrupt input safety
// ============================================================================

#[test]
fn test_every_truncation_fails() {
    let codec = KeyCodec::default();

    for row in sample_rows() {
        let key = CacheKey::new(&9, QUERY, &row, Some(ParamValue::from("fmt")));
        let bytes = codec.encode(&key).unwrap();

        for len in 0..bytes.len() {
            let token = STANDARD.encode(&bytes[..len]);
            let err = codec.decode_token(&token).unwrap_err();
            assert!(err.is_decode_failure(), "prefix {} gave {:?}", len, err);
        }
    }
}

#[test]
fn test_mutated_bytes_never_panic() {
    let codec = KeyCodec::default();
    let row = ParamRow::new()
        .with("ids", vec![1i64, 2])
        .with("name", "n")
        .with("when", ParamValue::Date(0));
    let key = CacheKey::new(&9, QUERY, &row, Some(ParamValue::Boolean(true)));
    let bytes = codec.encode(&key).unwrap();

    for pos in 0..bytes.len() {
        for replacement in [0x00u8, 0x01, 0x7f, 0x80, 0xff] {
            let mut mutated = bytes.clone();
            mutated[pos] = replacement;

            // A changed payload byte can still be a well-formed key
            if let Err(e) = codec.decode(&mutated) {
                assert!(e.is_decode_failure(), "pos {} gave {:?}", pos, e);
            }
        }
    }
}

#[test]
fn test_random_text_is_a_miss() {
    for token in ["", "====", "AAAAAAAA", "////", "SGVsbG8gd29ybGQ=", "not a token"] {
        assert!(decode_for_lookup(token).is_none(), "{:?}", token);
    }

    let err = decode_token("SGVsbG8gd29ybGQ=").unwrap_err();
    assert!(err.is_decode_failure());
    assert!(!matches!(err, Error::InvalidArgument(_)));
}

// ============================================================================
// Serde
// ============================================================================

#[test]
fn test_serde_as_token() {
    let key = build(42, QUERY, &ParamRow::new().with("id", 7i64));

    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(json, format!("\"{}\"", key.to_token().unwrap()));

    let back: CacheKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, key);

    assert!(serde_json::from_str::<CacheKey>("\"!!\"").is_err());
}

#[test]
fn test_from_str() {
    let key = build(42, QUERY, &ParamRow::new());
    let parsed: CacheKey = key.to_token().unwrap().parse().unwrap();
    assert_eq!(parsed, key);
}
