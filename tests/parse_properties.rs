//! Property Tests
//!
//! Universal properties of the query engine:
//! - parse terminates without panicking on any input
//! - rendering a coerced value and coercing it again keeps the tag
//! - operator keys per field match the distinct operators used
//! - limit never exceeds maxLimit
//! - reserved and ignored keys never reach the criteria document

use std::collections::{HashMap, HashSet};

use chrono::DateTime;
use proptest::prelude::*;
use q2doc::query::{
    coerce, parse, parse_default, CoercedValue, Configuration, Criterion, OperatorToken,
};

// Strategy for the six comparison tokens
fn operator_strategy() -> impl Strategy<Value = OperatorToken> {
    prop_oneof![
        Just(OperatorToken::Eq),
        Just(OperatorToken::Ne),
        Just(OperatorToken::Gt),
        Just(OperatorToken::Gte),
        Just(OperatorToken::Lt),
        Just(OperatorToken::Lte),
    ]
}

// Strategy for typed values that can appear in criteria
fn value_strategy() -> impl Strategy<Value = CoercedValue> {
    // 0000-01-01T00:00:00Z ..= 9999-12-31T23:59:59.999Z
    let instants = (-62_167_219_200_000i64..=253_402_300_799_999i64)
        .prop_filter_map("out of range", DateTime::from_timestamp_millis);

    prop_oneof![
        any::<bool>().prop_map(CoercedValue::Boolean),
        any::<i64>().prop_map(CoercedValue::Integer),
        any::<f64>()
            .prop_filter("finite", |x| x.is_finite())
            .prop_map(CoercedValue::Float),
        instants.prop_map(CoercedValue::DateTime),
        "[a-z]{1,8}".prop_map(|s| coerce(&s)),
    ]
}

proptest! {
    #[test]
    fn test_parse_never_panics(query in ".*") {
        let _ = parse_default(&query);
    }

    #[test]
    fn test_parse_never_panics_on_query_alphabet(query in "[a-z0-9=<>!&%+,.:TZ-]{0,64}") {
        let parsed = parse_default(&query);
        let _ = parsed.to_json();
    }

    #[test]
    fn test_coercion_tag_is_idempotent(raw in ".*") {
        let value = coerce(&raw);
        prop_assert_eq!(coerce(&value.to_string()), value);
    }

    #[test]
    fn test_typed_values_round_trip(value in value_strategy()) {
        let rendered = value.to_string();
        prop_assert_eq!(coerce(&rendered), value);
    }

    #[test]
    fn test_operator_keys_match_tokens(
        triples in prop::collection::vec(
            ("[a-d]", operator_strategy(), "[a-z0-9]{1,4}"),
            1..12,
        )
    ) {
        let query = triples
            .iter()
            .map(|(field, op, value)| format!("{}{}{}", field, op.symbol(), value))
            .collect::<Vec<_>>()
            .join("&");

        let mut used: HashMap<&str, HashSet<OperatorToken>> = HashMap::new();
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for (field, op, _) in &triples {
            used.entry(field.as_str()).or_default().insert(*op);
            *occurrences.entry(field.as_str()).or_default() += 1;
        }

        let parsed = parse_default(&query);
        prop_assert_eq!(parsed.criteria.len(), used.len());

        for (field, tokens) in &used {
            let criterion = parsed.criteria.get(field).expect("field present");
            match criterion {
                Criterion::Equals(_) => {
                    prop_assert_eq!(tokens.len(), 1);
                    prop_assert!(tokens.contains(&OperatorToken::Eq));
                    prop_assert_eq!(occurrences[field], 1);
                }
                Criterion::Operators(_) => {
                    prop_assert_eq!(criterion.operator_count(), tokens.len());
                }
            }
        }
    }

    #[test]
    fn test_limit_never_exceeds_max(limit in 0u32..100_000, max in 0i64..10_000) {
        let config = Configuration::builder().max_limit(max).build().unwrap();
        let parsed = parse(&format!("limit={}", limit), &config);
        prop_assert_eq!(parsed.options.limit, Some(u64::from(limit).min(max as u64)));
    }

    #[test]
    fn test_reserved_and_ignored_keys_never_in_criteria(
        keys in prop::collection::vec(
            prop_oneof![
                Just("offset"),
                Just("skip"),
                Just("limit"),
                Just("fields"),
                Just("sort"),
                Just("envelope"),
            ],
            0..8,
        ),
        op in operator_strategy(),
        value in "[a-z0-9,+-]{0,6}",
    ) {
        let config = Configuration::builder().ignore(["envelope"]).build().unwrap();
        let query = keys
            .iter()
            .map(|key| format!("{}{}{}", key, op.symbol(), value))
            .collect::<Vec<_>>()
            .join("&");

        let parsed = parse(&query, &config);
        prop_assert!(parsed.criteria.is_empty());
    }
}
