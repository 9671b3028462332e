//! Observable events for the query engine
//!
//! Every condition the engine absorbs instead of reporting has a named
//! event, emitted through `tracing` with the name in the `event` field.

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Tokenizer
    /// Segment had no operator or an empty key
    SegmentDropped,

    // Router
    /// Key matched the ignore set
    KeyIgnored,

    // Options
    /// Reserved key value could not be used
    OptionRejected,
    /// Limit was reduced to the configured maximum
    LimitClamped,

    // Pipeline
    /// Query string fully parsed
    QueryParsed,

    // CLI
    /// Configuration file loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SegmentDropped => "QUERY_SEGMENT_DROPPED",
            Event::KeyIgnored => "QUERY_KEY_IGNORED",
            Event::OptionRejected => "QUERY_OPTION_REJECTED",
            Event::LimitClamped => "QUERY_LIMIT_CLAMPED",
            Event::QueryParsed => "QUERY_PARSED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }
}
