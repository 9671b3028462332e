//! # Query Parser
//!
//! Runs the full pipeline for one query string:
//! tokenizer, key router, then either coercion into the criteria document
//! or assignment into the options document.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::coerce::coerce;
use super::config::Configuration;
use super::criteria::{CriteriaBuilder, CriteriaDocument};
use super::options::{OptionsBuilder, OptionsDocument};
use super::router::{route, Route};
use super::tokenizer::tokenize;
use crate::observability::Event;

/// Result of parsing one query string
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedQuery {
    /// Filter document
    pub criteria: CriteriaDocument,

    /// Pagination, projection and sort options
    pub options: OptionsDocument,
}

impl ParsedQuery {
    /// Convert to `{"criteria": ..., "options": ...}`
    pub fn to_json(&self) -> Value {
        json!({
            "criteria": self.criteria.to_json(),
            "options": self.options.to_json(),
        })
    }
}

/// Parse a query string into criteria and options.
///
/// Never fails: malformed segments are dropped, values that match no type
/// stay strings and unusable option values are ignored.
pub fn parse(query: &str, config: &Configuration) -> ParsedQuery {
    let mut criteria = CriteriaBuilder::new();
    let mut options = OptionsBuilder::new(config.max_limit());

    for pair in tokenize(query) {
        match route(&pair.key, config) {
            Route::Ignore => {
                debug!(
                    event = Event::KeyIgnored.as_str(),
                    key = pair.key.as_str(),
                    "query key ignored"
                );
            }
            Route::Option(key) => options.apply(key, &pair.raw_value),
            Route::Criteria => criteria.push(&pair.key, pair.operator, coerce(&pair.raw_value)),
        }
    }

    let parsed = ParsedQuery {
        criteria: criteria.finish(),
        options: options.finish(),
    };

    debug!(
        event = Event::QueryParsed.as_str(),
        criteria_fields = parsed.criteria.len(),
        operator_keys = parsed
            .criteria
            .iter()
            .map(|(_, criterion)| criterion.operator_count())
            .sum::<usize>(),
        has_options = !parsed.options.is_empty(),
        "query parsed"
    );

    parsed
}

/// Parse with the default configuration
pub fn parse_default(query: &str) -> ParsedQuery {
    parse(query, &Configuration::default())
}
