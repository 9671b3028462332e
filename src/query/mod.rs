//! # Query Module
//!
//! Translates URL query strings into a criteria document and an options
//! document for a document store.
//!
//! ```
//! use q2doc::query::{parse, Configuration};
//!
//! let config = Configuration::builder().max_limit(50).build().unwrap();
//! let parsed = parse("age>=18&status!=banned&limit=100&sort=-age", &config);
//!
//! assert_eq!(
//!     parsed.to_json(),
//!     serde_json::json!({
//!         "criteria": {"age": {"$gte": 18}, "status": {"$ne": "banned"}},
//!         "options": {"limit": 50, "sort": {"age": -1}}
//!     })
//! );
//! ```

pub mod coerce;
pub mod config;
pub mod criteria;
pub mod errors;
pub mod options;
pub mod parser;
pub mod router;
pub mod tokenizer;

pub use coerce::{coerce, CoercedValue, ValueKind};
pub use config::{Configuration, ConfigurationBuilder, ReservedKey, ReservedKeys};
pub use criteria::{CriteriaBuilder, CriteriaDocument, Criterion, Operand, QueryOperator};
pub use errors::{ConfigError, ConfigResult};
pub use options::{OptionsBuilder, OptionsDocument, SortDirection};
pub use parser::{parse, parse_default, ParsedQuery};
pub use router::{route, Route};
pub use tokenizer::{tokenize, OperatorToken, RawPair};
