//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events during schema loading and record validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded
    ConfigLoaded,
    /// A schema file was loaded and registered
    SchemaLoaded,
    /// A schema file or definition was rejected
    SchemaRejected,
    /// All schemas in the schema directory loaded
    SchemasLoaded,
    /// Record validated successfully
    RecordAccepted,
    /// Record rejected with field failures
    RecordRejected,
    /// Batch input finished
    BatchComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::RecordAccepted => "RECORD_ACCEPTED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::BatchComplete => "BATCH_COMPLETE",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SchemaRejected | Event::RecordRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::SchemaLoaded,
            Event::SchemaRejected,
            Event::SchemasLoaded,
            Event::RecordAccepted,
            Event::RecordRejected,
            Event::BatchComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::RecordRejected.is_failure());
        assert!(Event::SchemaRejected.is_failure());
        assert!(!Event::RecordAccepted.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::RecordAccepted), "RECORD_ACCEPTED");
    }
}
