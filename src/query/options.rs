//! # Options Document
//!
//! Folds reserved query keys into pagination, projection and sort options.
//! Reserved keys are plain assignments; when one repeats, the last valid
//! occurrence wins.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::coerce::parse_integer;
use super::config::ReservedKey;
use crate::observability::Event;

/// Sort direction, serialized as `1` / `-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

/// Pagination, projection and sort options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsDocument {
    /// Number of records to skip
    pub skip: Option<u64>,

    /// Number of records to return, already capped
    pub limit: Option<u64>,

    /// Fields to include
    pub fields: Option<Vec<String>>,

    /// Sort keys in listed order
    pub sort: Option<Vec<(String, SortDirection)>>,
}

impl OptionsDocument {
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.limit.is_none() && self.fields.is_none() && self.sort.is_none()
    }

    /// Convert to JSON: `{skip, limit, fields: {f: true}, sort: {f: 1|-1}}`
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();
        if let Some(skip) = self.skip {
            doc.insert("skip".to_string(), Value::from(skip));
        }
        if let Some(limit) = self.limit {
            doc.insert("limit".to_string(), Value::from(limit));
        }
        if let Some(fields) = &self.fields {
            doc.insert(
                "fields".to_string(),
                Value::Object(
                    fields
                        .iter()
                        .map(|field| (field.clone(), Value::Bool(true)))
                        .collect(),
                ),
            );
        }
        if let Some(sort) = &self.sort {
            doc.insert(
                "sort".to_string(),
                Value::Object(
                    sort.iter()
                        .map(|(field, dir)| (field.clone(), Value::from(dir.as_i32())))
                        .collect(),
                ),
            );
        }
        Value::Object(doc)
    }
}

/// Serializes `fields` as a projection map
struct Projection<'a>(&'a [String]);

impl Serialize for Projection<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(field, &true)?;
        }
        map.end()
    }
}

/// Serializes `sort` as a field-to-direction map
struct SortSpec<'a>(&'a [(String, SortDirection)]);

impl Serialize for SortSpec<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, direction) in self.0 {
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }
}

impl Serialize for OptionsDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(skip) = &self.skip {
            map.serialize_entry("skip", skip)?;
        }
        if let Some(limit) = &self.limit {
            map.serialize_entry("limit", limit)?;
        }
        if let Some(fields) = &self.fields {
            map.serialize_entry("fields", &Projection(fields))?;
        }
        if let Some(sort) = &self.sort {
            map.serialize_entry("sort", &SortSpec(sort))?;
        }
        map.end()
    }
}

/// Accumulates reserved-key assignments
#[derive(Debug, Default)]
pub struct OptionsBuilder {
    max_limit: Option<u64>,
    options: OptionsDocument,
}

impl OptionsBuilder {
    pub fn new(max_limit: Option<u64>) -> Self {
        Self {
            max_limit,
            options: OptionsDocument::default(),
        }
    }

    /// Apply one reserved-key assignment
    pub fn apply(&mut self, key: ReservedKey, value: &str) {
        match key {
            ReservedKey::Skip => match parse_count(value) {
                Some(skip) => self.options.skip = Some(skip),
                None => reject(key, value),
            },
            ReservedKey::Limit => match parse_count(value) {
                Some(limit) => self.options.limit = Some(self.clamp_limit(limit)),
                None => reject(key, value),
            },
            ReservedKey::Fields => {
                let fields = parse_fields(value);
                if fields.is_empty() {
                    reject(key, value);
                } else {
                    self.options.fields = Some(fields);
                }
            }
            ReservedKey::Sort => {
                let sort = parse_sort(value);
                if sort.is_empty() {
                    reject(key, value);
                } else {
                    self.options.sort = Some(sort);
                }
            }
        }
    }

    fn clamp_limit(&self, limit: u64) -> u64 {
        match self.max_limit {
            Some(max) if limit > max => {
                debug!(
                    event = Event::LimitClamped.as_str(),
                    requested = limit,
                    max_limit = max,
                    "limit capped"
                );
                max
            }
            _ => limit,
        }
    }

    pub fn finish(self) -> OptionsDocument {
        self.options
    }
}

fn reject(key: ReservedKey, value: &str) {
    debug!(
        event = Event::OptionRejected.as_str(),
        key = key.as_str(),
        value,
        "unusable value for reserved key"
    );
}

/// Parse a non-negative integer for `skip` / `limit`
fn parse_count(value: &str) -> Option<u64> {
    parse_integer(value).and_then(|n| u64::try_from(n).ok())
}

/// Parse a comma-separated field list, keeping first occurrences
fn parse_fields(value: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    fields
}

/// Parse a comma-separated sort list (`a,+b,-c`)
fn parse_sort(value: &str) -> Vec<(String, SortDirection)> {
    let mut sort: Vec<(String, SortDirection)> = Vec::new();

    for part in value.split(',') {
        let part = part.trim();
        let (field, direction) = if let Some(field) = part.strip_prefix('-') {
            (field, SortDirection::Descending)
        } else {
            (part.strip_prefix('+').unwrap_or(part), SortDirection::Ascending)
        };

        let field = field.trim();
        if field.is_empty() {
            continue;
        }

        // A repeated field keeps its position and takes the later direction
        match sort.iter_mut().find(|(f, _)| f == field) {
            Some((_, existing)) => *existing = direction,
            None => sort.push((field.to_string(), direction)),
        }
    }

    sort
}
