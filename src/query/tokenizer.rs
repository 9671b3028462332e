//! # Query String Tokenizer
//!
//! Splits a raw query string into ordered `(key, operator, value)` triples.
//!
//! The comparison operator is embedded in each segment (`price>=10`,
//! `status!=done`), so segments are split on the earliest comparison token
//! rather than on `=` alone. Keys and values are percent-decoded only after
//! splitting so that an encoded `%3D` inside a value is never mistaken for
//! an operator.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::observability::Event;

/// Comparison operator embedded in a query segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorToken {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl OperatorToken {
    /// The punctuation this operator is written with
    pub fn symbol(&self) -> &'static str {
        match self {
            OperatorToken::Eq => "=",
            OperatorToken::Ne => "!=",
            OperatorToken::Gt => ">",
            OperatorToken::Gte => ">=",
            OperatorToken::Lt => "<",
            OperatorToken::Lte => "<=",
        }
    }

    /// Whether this is one of the ordering comparisons
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            OperatorToken::Gt | OperatorToken::Gte | OperatorToken::Lt | OperatorToken::Lte
        )
    }
}

/// Tokens tried at each position, longest first so `>=` is not read as `>`.
const OPERATOR_TOKENS: [OperatorToken; 6] = [
    OperatorToken::Ne,
    OperatorToken::Gte,
    OperatorToken::Lte,
    OperatorToken::Gt,
    OperatorToken::Lt,
    OperatorToken::Eq,
];

/// One decoded query segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPair {
    pub key: String,
    pub operator: OperatorToken,
    pub raw_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoding {
    /// Decode key and value separately after splitting
    Components,
    /// Input was decoded as a whole already
    Done,
}

/// Split a query string into ordered raw pairs.
///
/// Accepts a query that is either percent-encoded per component
/// (`a=1&b%3E=2`) or percent-encoded as one blob (`a%3D1%26b%3D2`).
/// Malformed segments are dropped, never reported.
pub fn tokenize(query: &str) -> Vec<RawPair> {
    let query = query.strip_prefix('?').unwrap_or(query);

    if is_encoded_blob(query) {
        let decoded = percent_decode_str(query).decode_utf8_lossy();
        return split_pairs(&decoded, Decoding::Done);
    }

    split_pairs(query, Decoding::Components)
}

/// A blob has its operators and separators escaped away.
fn is_encoded_blob(query: &str) -> bool {
    !query.contains(['=', '<', '>']) && query.contains('%')
}

fn split_pairs(query: &str, decoding: Decoding) -> Vec<RawPair> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .flat_map(|segment| split_segment(segment, decoding))
        .collect()
}

fn split_segment(segment: &str, decoding: Decoding) -> Vec<RawPair> {
    let Some((pos, operator)) = find_operator(segment) else {
        // An individually encoded segment inside an otherwise plain query,
        // possibly holding encoded separators of its own
        if decoding == Decoding::Components && segment.contains('%') {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            return split_pairs(&decoded, Decoding::Done);
        }
        debug!(
            event = Event::SegmentDropped.as_str(),
            segment,
            "query segment has no comparison operator"
        );
        return Vec::new();
    };

    let key = decode(&segment[..pos], decoding);
    if key.is_empty() {
        debug!(
            event = Event::SegmentDropped.as_str(),
            segment,
            "query segment has an empty key"
        );
        return Vec::new();
    }

    let raw_value = decode(&segment[pos + operator.symbol().len()..], decoding);

    vec![RawPair {
        key: key.into_owned(),
        operator,
        raw_value: raw_value.into_owned(),
    }]
}

/// Position and kind of the earliest comparison token in a segment
fn find_operator(segment: &str) -> Option<(usize, OperatorToken)> {
    let bytes = segment.as_bytes();
    (0..bytes.len()).find_map(|pos| {
        OPERATOR_TOKENS
            .iter()
            .find(|op| bytes[pos..].starts_with(op.symbol().as_bytes()))
            .map(|op| (pos, *op))
    })
}

fn decode(component: &str, decoding: Decoding) -> Cow<'_, str> {
    match decoding {
        Decoding::Components => percent_decode_str(component).decode_utf8_lossy(),
        Decoding::Done => Cow::Borrowed(component),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &str) -> Vec<(String, OperatorToken, String)> {
        tokenize(query)
            .into_iter()
            .map(|p| (p.key, p.operator, p.raw_value))
            .collect()
    }

    fn triple(key: &str, op: OperatorToken, value: &str) -> (String, OperatorToken, String) {
        (key.to_string(), op, value.to_string())
    }

    #[test]
    fn test_plain_assignment() {
        assert_eq!(
            pairs("field=value"),
            vec![triple("field", OperatorToken::Eq, "value")]
        );
    }

    #[test]
    fn test_every_operator() {
        assert_eq!(
            pairs("a=1&b!=2&c>3&d>=4&e<5&f<=6"),
            vec![
                triple("a", OperatorToken::Eq, "1"),
                triple("b", OperatorToken::Ne, "2"),
                triple("c", OperatorToken::Gt, "3"),
                triple("d", OperatorToken::Gte, "4"),
                triple("e", OperatorToken::Lt, "5"),
                triple("f", OperatorToken::Lte, "6"),
            ]
        );
    }

    #[test]
    fn test_earliest_token_wins() {
        // `=` inside the value must not split again
        assert_eq!(
            pairs("expr=a>b"),
            vec![triple("expr", OperatorToken::Eq, "a>b")]
        );
        assert_eq!(
            pairs("n>=x=y"),
            vec![triple("n", OperatorToken::Gte, "x=y")]
        );
    }

    #[test]
    fn test_bang_without_equals_is_part_of_key() {
        assert_eq!(
            pairs("a!b=c"),
            vec![triple("a!b", OperatorToken::Eq, "c")]
        );
    }

    #[test]
    fn test_malformed_and_empty_segments_dropped() {
        assert_eq!(
            pairs("&&novalue&a=1&=orphan&"),
            vec![triple("a", OperatorToken::Eq, "1")]
        );
    }

    #[test]
    fn test_empty_value_kept() {
        assert_eq!(pairs("a="), vec![triple("a", OperatorToken::Eq, "")]);
    }

    #[test]
    fn test_leading_question_mark() {
        assert_eq!(pairs("?a=1"), vec![triple("a", OperatorToken::Eq, "1")]);
    }

    #[test]
    fn test_components_decoded_after_split() {
        assert_eq!(
            pairs("na%20me=a%3Db"),
            vec![triple("na me", OperatorToken::Eq, "a=b")]
        );
    }

    #[test]
    fn test_plus_is_literal() {
        assert_eq!(
            pairs("sort=a,+b"),
            vec![triple("sort", OperatorToken::Eq, "a,+b")]
        );
    }

    #[test]
    fn test_encoded_blob() {
        // encodeURIComponent("d=2010-04-01T13:00:30.250+01:00")
        assert_eq!(
            pairs("d%3D2010-04-01T13%3A00%3A30.250%2B01%3A00"),
            vec![triple("d", OperatorToken::Eq, "2010-04-01T13:00:30.250+01:00")]
        );
    }

    #[test]
    fn test_encoded_blob_with_separators() {
        assert_eq!(
            pairs("a%3D1%26b%3E%3D2"),
            vec![
                triple("a", OperatorToken::Eq, "1"),
                triple("b", OperatorToken::Gte, "2"),
            ]
        );
    }

    #[test]
    fn test_encoded_segment_in_plain_query() {
        assert_eq!(
            pairs("a=1&b%3C5"),
            vec![
                triple("a", OperatorToken::Eq, "1"),
                triple("b", OperatorToken::Lt, "5"),
            ]
        );
    }

    #[test]
    fn test_encoded_segment_with_separators_in_plain_query() {
        assert_eq!(
            pairs("a%3D1%26b%3D2&c=3"),
            vec![
                triple("a", OperatorToken::Eq, "1"),
                triple("b", OperatorToken::Eq, "2"),
                triple("c", OperatorToken::Eq, "3"),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let result = tokenize("a=%FF");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].raw_value, "\u{FFFD}");
    }
}
