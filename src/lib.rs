//! q2doc - Translate URL query strings into document-store criteria and options
//!
//! The engine lives in [`query`]; [`cli`] is the `q2doc` binary's front end.

pub mod cli;
pub mod observability;
pub mod query;

pub use query::{parse, parse_default, ConfigError, Configuration, ParsedQuery};
