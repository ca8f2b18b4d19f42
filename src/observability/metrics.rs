//! Validation counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::schema::{FailureKind, ValidationOutcome};

/// Counters for validated records and field failures
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    records_accepted: AtomicU64,
    records_rejected: AtomicU64,
    missing_required: AtomicU64,
    coercion_failures: AtomicU64,
    custom_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one validation outcome and each of its field failures.
    pub fn record_outcome(&self, outcome: &ValidationOutcome) {
        if outcome.is_success() {
            self.records_accepted.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.records_rejected.fetch_add(1, Ordering::Relaxed);
        for failure in outcome.failures() {
            let counter = match failure.kind {
                FailureKind::MissingRequiredField => &self.missing_required,
                FailureKind::TypeCoercionFailure => &self.coercion_failures,
                FailureKind::CustomValidationFailure => &self.custom_failures,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn records_accepted(&self) -> u64 {
        self.records_accepted.load(Ordering::Relaxed)
    }

    pub fn records_rejected(&self) -> u64 {
        self.records_rejected.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_accepted: self.records_accepted(),
            records_rejected: self.records_rejected(),
            missing_required: self.missing_required.load(Ordering::Relaxed),
            coercion_failures: self.coercion_failures.load(Ordering::Relaxed),
            custom_failures: self.custom_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_accepted: u64,
    pub records_rejected: u64,
    pub missing_required: u64,
    pub coercion_failures: u64,
    pub custom_failures: u64,
}

impl MetricsSnapshot {
    /// Total records seen
    pub fn records_total(&self) -> u64 {
        self.records_accepted + self.records_rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldFailure, ValidatedRecord};

    #[test]
    fn test_counts_outcomes() {
        let metrics = MetricsRegistry::new();
        metrics.record_outcome(&ValidationOutcome::Success(ValidatedRecord::default()));
        metrics.record_outcome(&ValidationOutcome::Failure(vec![
            FieldFailure::missing("a"),
            FieldFailure::coercion("b", "expected int, got string"),
            FieldFailure::custom("c", "is_string: value must be a string, got int"),
        ]));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.records_accepted, 1);
        assert_eq!(snapshot.records_rejected, 1);
        assert_eq!(snapshot.missing_required, 1);
        assert_eq!(snapshot.coercion_failures, 1);
        assert_eq!(snapshot.custom_failures, 1);
        assert_eq!(snapshot.records_total(), 2);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(MetricsRegistry::new().snapshot()).unwrap();
        assert_eq!(json["records_accepted"], 0);
    }
}
