//! # Handoff Channel
//!
//! The capture surface and the keyboard run as separate processes. They meet
//! in a small shared region holding four keys:
//!
//! | key            | value                                  |
//! |----------------|----------------------------------------|
//! | `pendingScans` | [`PendingBatch`] waiting to be consumed |
//! | `lastScanMode` | last [`ScanMode`] used                  |
//! | `lastListId`   | last list scanned into                  |
//! | `knownListIds` | sorted set of list names                |
//!
//! Writes are last-writer-wins. The only coordinated operation is
//! [`HandoffChannel::fetch_and_clear`], which hands the pending batch to at
//! most one consumer.
//!
//! ## Degraded Mode
//!
//! The shared region is optional infrastructure. When it cannot be reached the
//! channel logs at `debug` and behaves as if it were empty: reads return
//! nothing, writes are dropped. Callers never see an error from this module.

use crate::error::{Result, ScanError};
use crate::model::{Candidate, PendingBatch, ScanMode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

pub mod backend;
pub mod fs_handoff;
pub mod mem_handoff;

use backend::HandoffBackend;

pub const PENDING_SCANS_KEY: &str = "pendingScans";
pub const LAST_SCAN_MODE_KEY: &str = "lastScanMode";
pub const LAST_LIST_ID_KEY: &str = "lastListId";
pub const KNOWN_LIST_IDS_KEY: &str = "knownListIds";

/// How often and how patiently a consumer re-checks for a batch that may not
/// have been written yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

pub struct HandoffChannel<B: HandoffBackend> {
    backend: B,
}

impl<B: HandoffBackend> HandoffChannel<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- Pending batch ---

    pub fn save_pending(&self, batch: &PendingBatch) {
        self.put(PENDING_SCANS_KEY, batch);
    }

    pub fn load_pending(&self) -> PendingBatch {
        self.get(PENDING_SCANS_KEY).unwrap_or_default()
    }

    /// Return the pending batch and empty the slot in one step.
    pub fn fetch_and_clear(&self) -> PendingBatch {
        let taken = self.backend.take(PENDING_SCANS_KEY);
        self.degrade(PENDING_SCANS_KEY, taken)
            .flatten()
            .and_then(|raw| self.decode(PENDING_SCANS_KEY, &raw))
            .unwrap_or_default()
    }

    pub fn clear_pending(&self) {
        let removed = self.backend.remove(PENDING_SCANS_KEY);
        self.degrade(PENDING_SCANS_KEY, removed);
    }

    /// Add one capture to the pending batch, keeping its mode and list.
    pub fn append_pending(&self, candidate: Candidate) {
        let mut batch = self.load_pending();
        batch.candidates.push(candidate);
        self.save_pending(&batch);
    }

    /// `fetch_and_clear` until something arrives or the policy runs out.
    pub fn drain_with_retry(&self, policy: RetryPolicy) -> PendingBatch {
        let attempts = policy.attempts.max(1);
        for attempt in 1..=attempts {
            let batch = self.fetch_and_clear();
            if !batch.is_empty() {
                return batch;
            }
            if attempt < attempts {
                tracing::debug!(attempt, "no pending scans yet, retrying");
                thread::sleep(policy.delay);
            }
        }
        PendingBatch::default()
    }

    // --- Last mode / list ---

    pub fn set_last_mode(&self, mode: ScanMode) {
        self.put(LAST_SCAN_MODE_KEY, &mode);
    }

    pub fn last_mode(&self) -> Option<ScanMode> {
        self.get(LAST_SCAN_MODE_KEY)
    }

    pub fn set_last_list_id(&self, list_id: &str) {
        let list_id = list_id.trim();
        if list_id.is_empty() {
            return;
        }
        self.put(LAST_LIST_ID_KEY, &list_id);
    }

    pub fn last_list_id(&self) -> Option<String> {
        self.get::<String>(LAST_LIST_ID_KEY)
            .filter(|id| !id.trim().is_empty())
    }

    // --- Known lists ---

    pub fn add_known_list_id(&self, list_id: &str) {
        let list_id = list_id.trim();
        if list_id.is_empty() {
            return;
        }
        let mut known = self.known_set();
        if known.insert(list_id.to_string()) {
            self.put(KNOWN_LIST_IDS_KEY, &known);
        }
    }

    pub fn remove_known_list_id(&self, list_id: &str) {
        let mut known = self.known_set();
        if known.remove(list_id.trim()) {
            self.put(KNOWN_LIST_IDS_KEY, &known);
        }
    }

    /// Known list names, sorted
    pub fn known_list_ids(&self) -> Vec<String> {
        self.known_set().into_iter().collect()
    }

    fn known_set(&self) -> BTreeSet<String> {
        self.get(KNOWN_LIST_IDS_KEY).unwrap_or_default()
    }

    // --- Plumbing ---

    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let read = self.backend.read(key);
        self.degrade(key, read)
            .flatten()
            .and_then(|raw| self.decode(key, &raw))
    }

    fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let written = serde_json::to_string(value)
            .map_err(ScanError::from)
            .and_then(|raw| self.backend.write(key, &raw));
        self.degrade(key, written);
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, raw: &str) -> Option<T> {
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "unreadable handoff value ignored");
                None
            }
        }
    }

    fn degrade<T>(&self, key: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    key,
                    region = %self.backend.describe(),
                    error = %e,
                    "handoff unavailable"
                );
                None
            }
        }
    }
}
