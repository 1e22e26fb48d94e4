//! # Deduplicating Ingestion
//!
//! [`ScanService`] is the only code path that creates scan items. A scan goes
//! through two independent duplicate filters before it is stored:
//!
//! 1. **Debounce (in memory, per list)**: the last accepted `(code_raw, code_type)`
//!    of every list is remembered with its arrival time. The same code arriving
//!    again within the debounce interval is rejected with
//!    [`ScanError::DuplicateWithinInterval`] and never reaches the store. This
//!    absorbs a camera re-reading the code it is still pointed at.
//!
//! 2. **Bucketed upsert (durable)**: the store collapses writes for the same
//!    `(list_id, code_raw, code_type)` whose timestamps fall into the same
//!    bucket (one second by default) into a single record, updating label and
//!    meta instead of inserting. This works across processes and restarts,
//!    where the debounce cache does not exist.
//!
//! The two windows are configured separately ([`IngestSettings`]); neither is
//! derived from the other.
//!
//! ## Failure Handling
//!
//! If the durable write fails, the debounce entry recorded for that attempt is
//! removed again so an immediate retry is not reported as a duplicate. The
//! service never retries on its own.

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, ScanError};
use crate::model::{normalize_label, require_non_empty, Candidate, ItemDraft, ItemMeta, ScanItem};
use crate::store::{DataStore, SharedStore, Upserted, Window};
use crate::telemetry::{ScanEvent, ScanTelemetry, TracingTelemetry};
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1500;
pub const DEFAULT_BUCKET_MS: u64 = 1000;
/// Upper bound for both windows: one day.
pub const MAX_WINDOW_MS: u64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSettings {
    pub debounce: Duration,
    pub bucket: Duration,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DEBOUNCE_MS, DEFAULT_BUCKET_MS)
    }
}

impl IngestSettings {
    /// Both values are capped at [`MAX_WINDOW_MS`]; the bucket is at least one millisecond.
    pub fn from_millis(debounce_ms: u64, bucket_ms: u64) -> Self {
        Self {
            debounce: window_millis(debounce_ms),
            // A zero-width bucket would never match anything
            bucket: window_millis(bucket_ms.max(1)),
        }
    }
}

fn window_millis(ms: u64) -> Duration {
    let ms = i64::try_from(ms.min(MAX_WINDOW_MS)).unwrap_or(i64::MAX);
    Duration::milliseconds(ms)
}

/// The bucket `created_at` falls into: `[floor(created_at, width), +width)`.
pub fn bucket_window(created_at: DateTime<Utc>, width: Duration) -> Window {
    let width_ms = width.num_milliseconds().max(1);
    let start_ms = created_at.timestamp_millis().div_euclid(width_ms) * width_ms;
    let start = Utc
        .timestamp_millis_opt(start_ms)
        .single()
        .unwrap_or(created_at);
    let end = start
        .checked_add_signed(Duration::milliseconds(width_ms))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Window { start, end }
}

#[derive(Debug, Clone)]
struct DebounceEntry {
    code_raw: String,
    code_type: String,
    timestamp: DateTime<Utc>,
}

/// Result of committing a batch of candidates.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    pub inserted: Vec<ScanItem>,
    pub merged: Vec<ScanItem>,
    pub skipped: usize,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.inserted.len() + self.merged.len()
    }
}

pub struct ScanService<S: DataStore> {
    store: SharedStore<S>,
    settings: IngestSettings,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn ScanTelemetry>,
    last_accepted: Mutex<HashMap<String, DebounceEntry>>,
}

impl<S: DataStore> ScanService<S> {
    pub fn new(store: SharedStore<S>, settings: IngestSettings) -> Self {
        Self::with_parts(store, settings, Arc::new(SystemClock), Arc::new(TracingTelemetry))
    }

    pub fn with_parts(
        store: SharedStore<S>,
        settings: IngestSettings,
        clock: Arc<dyn Clock>,
        telemetry: Arc<dyn ScanTelemetry>,
    ) -> Self {
        Self {
            store,
            settings,
            clock,
            telemetry,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    /// Current time on the service clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn settings(&self) -> IngestSettings {
        self.settings
    }

    /// Validate, debounce and durably store one scan.
    pub fn add_scan(
        &self,
        list_id: &str,
        code_raw: &str,
        code_type: &str,
        label: Option<String>,
    ) -> Result<ScanItem> {
        let list_id = require_non_empty(list_id, "listId")?;
        let code_raw = require_non_empty(code_raw, "codeRaw")?;
        let code_type = require_non_empty(code_type, "codeType")?;
        let label = normalize_label(label);

        let event = ScanEvent::new(&list_id, &code_raw, &code_type);
        let now = self.clock.now();

        if !self.accept(&list_id, &code_raw, &code_type, now) {
            self.telemetry.scan_duplicate(&event);
            return Err(ScanError::DuplicateWithinInterval);
        }

        let stored = {
            let mut store = self.store.lock();
            list_meta(&*store, &list_id).and_then(|meta| {
                let draft = ItemDraft {
                    list_id: list_id.clone(),
                    code_raw: code_raw.clone(),
                    code_type: code_type.clone(),
                    label,
                    created_at: now,
                    meta,
                };
                store.upsert_item(draft, bucket_window(now, self.settings.bucket))
            })
        };

        match stored {
            Ok(upserted) => {
                self.telemetry.scan_success(&event);
                Ok(upserted.into_item())
            }
            Err(e) => {
                self.rollback(&list_id, now);
                self.telemetry.scan_error(&event, &e);
                Err(e)
            }
        }
    }

    /// Commit captures drained from the handoff channel into `list_id`.
    ///
    /// Each candidate keeps its own capture time; only the durable bucket
    /// applies. Candidates with a blank value are skipped.
    pub fn ingest_candidates(&self, list_id: &str, candidates: &[Candidate]) -> Result<IngestReport> {
        let list_id = require_non_empty(list_id, "listId")?;
        let mut report = IngestReport::default();
        if candidates.is_empty() {
            return Ok(report);
        }

        let mut store = self.store.lock();
        let meta = list_meta(&*store, &list_id)?;

        for candidate in candidates {
            let code_raw = candidate.value.trim();
            if code_raw.is_empty() {
                report.skipped += 1;
                continue;
            }

            let draft = ItemDraft {
                list_id: list_id.clone(),
                code_raw: code_raw.to_string(),
                code_type: candidate.code_type(),
                label: None,
                created_at: candidate.timestamp,
                meta: meta.clone(),
            };
            let event = ScanEvent::new(&draft.list_id, &draft.code_raw, &draft.code_type);

            match store.upsert_item(draft, bucket_window(candidate.timestamp, self.settings.bucket)) {
                Ok(Upserted::Inserted(item)) => {
                    self.telemetry.scan_success(&event);
                    report.inserted.push(item);
                }
                Ok(Upserted::Merged { item, .. }) => {
                    self.telemetry.scan_duplicate(&event);
                    report.merged.push(item);
                }
                Err(e) => {
                    self.telemetry.scan_error(&event, &e);
                    return Err(e);
                }
            }
        }

        Ok(report)
    }

    /// Record the scan as the list's last accepted one, unless it repeats it too soon.
    fn accept(&self, list_id: &str, code_raw: &str, code_type: &str, now: DateTime<Utc>) -> bool {
        let mut last = self.last_accepted.lock();
        if let Some(entry) = last.get(list_id) {
            if entry.code_raw == code_raw
                && entry.code_type == code_type
                && now - entry.timestamp < self.settings.debounce
            {
                return false;
            }
        }

        last.insert(
            list_id.to_string(),
            DebounceEntry {
                code_raw: code_raw.to_string(),
                code_type: code_type.to_string(),
                timestamp: now,
            },
        );
        true
    }

    /// Forget the entry recorded at `at`; a newer entry from another call stays.
    fn rollback(&self, list_id: &str, at: DateTime<Utc>) {
        let mut last = self.last_accepted.lock();
        if last.get(list_id).is_some_and(|e| e.timestamp == at) {
            last.remove(list_id);
        }
    }
}

fn list_meta<S: DataStore>(store: &S, list_id: &str) -> Result<Option<ItemMeta>> {
    Ok(store
        .find_list_by_name(list_id)?
        .and_then(|list| list.meta.non_empty()))
}
