//! Scan outcome reporting.
//!
//! The ingestion service reports every scan as a success, a suppressed
//! duplicate or an error. Sinks return nothing, so reporting can never change
//! the result the caller gets back.

use crate::error::ScanError;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The fields every telemetry event carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub list_id: String,
    pub code_raw: String,
    pub code_type: String,
}

impl ScanEvent {
    pub fn new(list_id: &str, code_raw: &str, code_type: &str) -> Self {
        Self {
            list_id: list_id.to_string(),
            code_raw: code_raw.to_string(),
            code_type: code_type.to_string(),
        }
    }

    /// Scanned codes can be sensitive; logs carry a hash instead of the value.
    pub fn code_hash(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.code_raw.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

pub trait ScanTelemetry: Send + Sync {
    fn scan_success(&self, event: &ScanEvent);
    fn scan_duplicate(&self, event: &ScanEvent);
    fn scan_error(&self, event: &ScanEvent, error: &ScanError);
}

/// Default sink: structured `tracing` events under the `scanlist::telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl ScanTelemetry for TracingTelemetry {
    fn scan_success(&self, event: &ScanEvent) {
        tracing::info!(
            target: "scanlist::telemetry",
            list = %event.list_id,
            code = %event.code_hash(),
            code_type = %event.code_type,
            "scan_success"
        );
    }

    fn scan_duplicate(&self, event: &ScanEvent) {
        tracing::info!(
            target: "scanlist::telemetry",
            list = %event.list_id,
            code = %event.code_hash(),
            code_type = %event.code_type,
            "scan_duplicate"
        );
    }

    fn scan_error(&self, event: &ScanEvent, error: &ScanError) {
        tracing::error!(
            target: "scanlist::telemetry",
            list = %event.list_id,
            code = %event.code_hash(),
            code_type = %event.code_type,
            error = %error,
            "scan_error"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Duplicate,
    Error(String),
}

/// Keeps every event in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<(Outcome, ScanEvent)>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Outcome, ScanEvent)> {
        self.events.lock().clone()
    }

    pub fn count(&self, outcome: &Outcome) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|(o, _)| match (o, outcome) {
                (Outcome::Error(_), Outcome::Error(_)) => true,
                (a, b) => a == b,
            })
            .count()
    }

    pub fn successes(&self) -> usize {
        self.count(&Outcome::Success)
    }

    pub fn duplicates(&self) -> usize {
        self.count(&Outcome::Duplicate)
    }

    pub fn errors(&self) -> usize {
        self.count(&Outcome::Error(String::new()))
    }
}

impl ScanTelemetry for RecordingTelemetry {
    fn scan_success(&self, event: &ScanEvent) {
        self.events.lock().push((Outcome::Success, event.clone()));
    }

    fn scan_duplicate(&self, event: &ScanEvent) {
        self.events.lock().push((Outcome::Duplicate, event.clone()));
    }

    fn scan_error(&self, event: &ScanEvent, error: &ScanError) {
        self.events
            .lock()
            .push((Outcome::Error(error.to_string()), event.clone()));
    }
}
