//! Observability for q2doc
//!
//! The library only emits `tracing` events; installing a subscriber is
//! left to the binary (see [`init_tracing`]).
//!
//! # Usage
//!
//! ```ignore
//! use q2doc::observability::{init_tracing, Event};
//!
//! init_tracing("warn");
//! tracing::debug!(event = Event::QueryParsed.as_str(), "done");
//! ```

mod events;

pub use events::Event;

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`
pub const LOG_ENV: &str = "Q2DOC_LOG";

/// Install a stderr subscriber.
///
/// The filter comes from `Q2DOC_LOG`, then `RUST_LOG`, then `default_filter`.
/// Calling this twice is harmless; the second install is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.to_string());

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}
