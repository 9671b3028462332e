//! # Key Router
//!
//! Decides where each raw pair goes: dropped, into the options document, or
//! through coercion into the criteria document.

use super::config::{Configuration, ReservedKey};

/// Destination of a raw pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Key is in the ignore set
    Ignore,
    /// Key names a pagination, projection or sort option
    Option(ReservedKey),
    /// Key is a criteria field
    Criteria,
}

/// Classify a key. The ignore set takes precedence over reserved names.
pub fn route(key: &str, config: &Configuration) -> Route {
    if config.is_ignored(key) {
        return Route::Ignore;
    }

    match config.reserved_key(key) {
        Some(reserved) => Route::Option(reserved),
        None => Route::Criteria,
    }
}
