//! # Value Coercion
//!
//! Infers a concrete type for a raw query value. Coercion is total: every
//! string maps to exactly one [`CoercedValue`], falling back to a string.
//!
//! Attempts run in a fixed order and the first match wins:
//!
//! 1. Boolean (`true` / `false`, case-sensitive)
//! 2. Integer (optional sign, digits only, fits in `i64`)
//! 3. Float (fractional part and/or exponent, finite)
//! 4. Date-time (`YYYY-MM` up to `YYYY-MM-DDThh:mm:ss.sss±hh:mm`), as UTC
//! 5. String

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};
use regex::{Captures, Regex};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// A typed query value
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    DateTime(DateTime<Utc>),
    String(String),
}

/// Tag of a [`CoercedValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    DateTime,
    String,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::DateTime => "datetime",
            ValueKind::String => "string",
        }
    }
}

impl CoercedValue {
    /// Get the type tag
    pub fn kind(&self) -> ValueKind {
        match self {
            CoercedValue::Boolean(_) => ValueKind::Boolean,
            CoercedValue::Integer(_) => ValueKind::Integer,
            CoercedValue::Float(_) => ValueKind::Float,
            CoercedValue::DateTime(_) => ValueKind::DateTime,
            CoercedValue::String(_) => ValueKind::String,
        }
    }

    /// Convert to JSON, with date-times as Extended JSON `{"$date": ...}`
    pub fn to_json(&self) -> Value {
        match self {
            CoercedValue::Boolean(b) => Value::Bool(*b),
            CoercedValue::Integer(i) => Value::from(*i),
            CoercedValue::Float(f) => Value::from(*f),
            CoercedValue::DateTime(dt) => json!({ "$date": render_instant(dt) }),
            CoercedValue::String(s) => Value::String(s.clone()),
        }
    }
}

/// Renders the value back to query-string text.
///
/// Re-coercing the rendered text yields the same tag: floats always carry
/// a fraction or exponent and instants use the millisecond `Z` form.
impl fmt::Display for CoercedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercedValue::Boolean(b) => write!(f, "{}", b),
            CoercedValue::Integer(i) => write!(f, "{}", i),
            CoercedValue::Float(x) => write!(f, "{:?}", x),
            CoercedValue::DateTime(dt) => f.write_str(&render_instant(dt)),
            CoercedValue::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for CoercedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CoercedValue::Boolean(b) => serializer.serialize_bool(*b),
            CoercedValue::Integer(i) => serializer.serialize_i64(*i),
            CoercedValue::Float(x) => serializer.serialize_f64(*x),
            CoercedValue::DateTime(dt) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$date", &render_instant(dt))?;
                map.end()
            }
            CoercedValue::String(s) => serializer.serialize_str(s),
        }
    }
}

fn render_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

type Attempt = fn(&str) -> Option<CoercedValue>;

/// Typed attempts in priority order; string is the fallback.
const COERCION_CHAIN: [(ValueKind, Attempt); 4] = [
    (ValueKind::Boolean, coerce_boolean),
    (ValueKind::Integer, coerce_integer),
    (ValueKind::Float, coerce_float),
    (ValueKind::DateTime, coerce_datetime),
];

/// Coerce a decoded raw value into its typed form
pub fn coerce(raw: &str) -> CoercedValue {
    COERCION_CHAIN
        .iter()
        .find_map(|(_, attempt)| attempt(raw))
        .unwrap_or_else(|| CoercedValue::String(raw.to_string()))
}

fn coerce_boolean(raw: &str) -> Option<CoercedValue> {
    match raw {
        "true" => Some(CoercedValue::Boolean(true)),
        "false" => Some(CoercedValue::Boolean(false)),
        _ => None,
    }
}

/// Shared with the options builder for `skip` and `limit`.
pub(crate) fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn coerce_integer(raw: &str) -> Option<CoercedValue> {
    parse_integer(raw).map(CoercedValue::Integer)
}

fn float_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[+-]?(?:(?:[0-9]+\.[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+)$",
        )
        .expect("Invalid float regex")
    })
}

fn coerce_float(raw: &str) -> Option<CoercedValue> {
    if !float_pattern().is_match(raw) {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(CoercedValue::Float)
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^([0-9]{4})-([0-9]{2})",
            r"(?:-([0-9]{2})",
            r"(?:T([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]{1,3}))?)?",
            r"(Z|[+-][0-9]{2}:[0-9]{2}))?)?$",
        ))
        .expect("Invalid date regex")
    })
}

fn coerce_datetime(raw: &str) -> Option<CoercedValue> {
    let caps = date_pattern().captures(raw)?;

    let year: i32 = caps[1].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, capture_u32(&caps, 2, 1), capture_u32(&caps, 3, 1))?;
    let millis = caps.get(7).map_or(Some(0), |m| fraction_millis(m.as_str()))?;
    let local = date.and_hms_milli_opt(
        capture_u32(&caps, 4, 0),
        capture_u32(&caps, 5, 0),
        capture_u32(&caps, 6, 0),
        millis,
    )?;

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") => FixedOffset::east_opt(0)?,
        Some(offset) => parse_offset(offset)?,
    };

    // Instants shifted outside four-digit years would not render back as dates
    let instant = offset.from_local_datetime(&local).single()?.with_timezone(&Utc);
    (0..=9999)
        .contains(&instant.year())
        .then_some(CoercedValue::DateTime(instant))
}

fn capture_u32(caps: &Captures<'_>, index: usize, default: u32) -> u32 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

/// `.5` is half a second, not five milliseconds
fn fraction_millis(digits: &str) -> Option<u32> {
    format!("{:0<3}", digits).parse().ok()
}

/// Parse `+hh:mm` / `-hh:mm`
fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let hours: i32 = offset.get(1..3)?.parse().ok()?;
    let minutes: i32 = offset.get(4..6)?.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
