//! # Criteria Document
//!
//! Folds coerced `(field, operator, value)` triples into a filter document
//! using document-store operator names.
//!
//! Per field:
//! - one `=` occurrence gives a bare value, several give `$in`
//! - one `!=` occurrence gives `$ne`, several give `$nin`
//! - `>`, `>=`, `<`, `<=` never aggregate; the last occurrence wins
//!
//! A field mixing these gets one sub-document holding every operator, in
//! the order each was first seen. A lone `=` next to other operators is
//! written as a one-element `$in`.

use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use super::coerce::CoercedValue;
use super::tokenizer::OperatorToken;

/// Document-store query operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryOperator {
    /// Greater than
    #[serde(rename = "$gt")]
    Gt,

    /// Greater than or equal
    #[serde(rename = "$gte")]
    Gte,

    /// Less than
    #[serde(rename = "$lt")]
    Lt,

    /// Less than or equal
    #[serde(rename = "$lte")]
    Lte,

    /// Not equal
    #[serde(rename = "$ne")]
    Ne,

    /// Value in list
    #[serde(rename = "$in")]
    In,

    /// Value not in list
    #[serde(rename = "$nin")]
    Nin,
}

impl QueryOperator {
    /// Get the operator name as the store expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::Gt => "$gt",
            QueryOperator::Gte => "$gte",
            QueryOperator::Lt => "$lt",
            QueryOperator::Lte => "$lte",
            QueryOperator::Ne => "$ne",
            QueryOperator::In => "$in",
            QueryOperator::Nin => "$nin",
        }
    }

    /// Store operator for a query token that was recorded `count` times
    pub fn for_token(token: OperatorToken, count: usize) -> Self {
        match token {
            OperatorToken::Eq => QueryOperator::In,
            OperatorToken::Ne if count > 1 => QueryOperator::Nin,
            OperatorToken::Ne => QueryOperator::Ne,
            OperatorToken::Gt => QueryOperator::Gt,
            OperatorToken::Gte => QueryOperator::Gte,
            OperatorToken::Lt => QueryOperator::Lt,
            OperatorToken::Lte => QueryOperator::Lte,
        }
    }

    /// Whether the operand is a list of values
    pub fn takes_list(&self) -> bool {
        matches!(self, QueryOperator::In | QueryOperator::Nin)
    }
}

/// Right-hand side of an operator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Value(CoercedValue),
    List(Vec<CoercedValue>),
}

impl Operand {
    pub fn to_json(&self) -> Value {
        match self {
            Operand::Value(value) => value.to_json(),
            Operand::List(values) => {
                Value::Array(values.iter().map(CoercedValue::to_json).collect())
            }
        }
    }
}

/// Condition on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Bare equality
    Equals(CoercedValue),
    /// Operator sub-document, in first-seen order
    Operators(Vec<(QueryOperator, Operand)>),
}

impl Criterion {
    /// Number of operator keys (zero for a bare value)
    pub fn operator_count(&self) -> usize {
        match self {
            Criterion::Equals(_) => 0,
            Criterion::Operators(ops) => ops.len(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Criterion::Equals(value) => value.to_json(),
            Criterion::Operators(ops) => Value::Object(
                ops.iter()
                    .map(|(op, operand)| (op.as_str().to_string(), operand.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Criterion::Equals(value) => value.serialize(serializer),
            Criterion::Operators(ops) => {
                let mut map = serializer.serialize_map(Some(ops.len()))?;
                for (op, operand) in ops {
                    map.serialize_entry(op, operand)?;
                }
                map.end()
            }
        }
    }
}

/// Filter document: field name to condition, in first-seen field order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaDocument {
    entries: Vec<(String, Criterion)>,
}

impl CriteriaDocument {
    pub fn get(&self, field: &str) -> Option<&Criterion> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, criterion)| criterion)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.entries
            .iter()
            .map(|(name, criterion)| (name.as_str(), criterion))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(name, criterion)| (name.to_string(), criterion.to_json()))
                .collect(),
        )
    }
}

impl Serialize for CriteriaDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, criterion) in &self.entries {
            map.serialize_entry(name, criterion)?;
        }
        map.end()
    }
}

/// Values recorded for one operator token on one field
type Slot = (OperatorToken, Vec<CoercedValue>);

/// Accumulates criteria triples; finalized once with [`finish`](Self::finish)
#[derive(Debug, Default)]
pub struct CriteriaBuilder {
    fields: Vec<(String, Vec<Slot>)>,
    positions: HashMap<String, usize>,
}

impl CriteriaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `field <operator> value`
    pub fn push(&mut self, field: &str, operator: OperatorToken, value: CoercedValue) {
        let position = match self.positions.get(field) {
            Some(position) => *position,
            None => {
                self.fields.push((field.to_string(), Vec::new()));
                self.positions.insert(field.to_string(), self.fields.len() - 1);
                self.fields.len() - 1
            }
        };

        let slots = &mut self.fields[position].1;
        match slots.iter_mut().find(|(token, _)| *token == operator) {
            Some((_, values)) if operator.is_range() => *values = vec![value],
            Some((_, values)) => values.push(value),
            None => slots.push((operator, vec![value])),
        }
    }

    pub fn finish(self) -> CriteriaDocument {
        CriteriaDocument {
            entries: self
                .fields
                .into_iter()
                .map(|(field, slots)| (field, finalize(slots)))
                .collect(),
        }
    }
}

fn finalize(slots: Vec<Slot>) -> Criterion {
    if let [(OperatorToken::Eq, values)] = slots.as_slice() {
        if let [value] = values.as_slice() {
            return Criterion::Equals(value.clone());
        }
    }

    Criterion::Operators(slots.into_iter().map(operator_entry).collect())
}

fn operator_entry((token, values): Slot) -> (QueryOperator, Operand) {
    let operator = QueryOperator::for_token(token, values.len());
    let operand = if operator.takes_list() {
        Operand::List(values)
    } else {
        match <[CoercedValue; 1]>::try_from(values) {
            Ok([value]) => Operand::Value(value),
            Err(values) => Operand::List(values),
        }
    };
    (operator, operand)
}
