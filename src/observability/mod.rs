//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed events
//! - Validation counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on validation
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use fieldcheck::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! let metrics = MetricsRegistry::new();
//! metrics.record_outcome(&outcome);
//! log_event_with_fields(Event::RecordAccepted, &[("schema_id", "aliased")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields
///
/// Failure events are logged at WARN, everything else at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    if event.is_failure() {
        Logger::warn(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}
