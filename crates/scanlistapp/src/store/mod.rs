//! # Storage Layer
//!
//! This module defines the durable store for lists and scan items. The
//! [`DataStore`] trait is what the rest of the crate talks to; raw I/O lives
//! behind [`backend::StorageBackend`].
//!
//! ## Two Entity Kinds
//!
//! - **Lists** ([`ScanList`]): named collections, looked up by their trimmed name.
//! - **Items** ([`ScanItem`]): scan records. `list_id` holds a list *name*, not a
//!   foreign key. Deleting or renaming a list leaves its items where they are, and
//!   they show up again if a list with the same name is created later.
//!
//! ## Write Model
//!
//! Every mutating call loads the affected index, applies the change and writes
//! the whole index back through the backend, which replaces the file atomically.
//! A call either completes or returns [`ScanError::Persistence`]; there is no
//! "saved later" state.
//!
//! Callers that share a store between the ingestion service and the facade wrap
//! it in a [`SharedStore`]. The mutex is the single execution context for
//! writes, which is what keeps the bucketed upsert's read and write together.
//!
//! ## Ordering
//!
//! Items of one list come back newest first: `created_at` descending, then the
//! store-assigned `seq` descending for items that share a timestamp.
//!
//! ## Implementations
//!
//! - [`scan_store::ScanStore`] over [`fs_backend::FsBackend`]: production.
//! - [`scan_store::ScanStore`] over [`mem_backend::MemBackend`]: tests.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── lists.json   # { uuid: ScanList }
//! └── items.json   # { uuid: ScanItem }
//! ```

use crate::error::{Result, ScanError};
use crate::model::{ItemDraft, ScanItem, ScanList};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod scan_store;

/// A store shared by the ingestion service and the facade.
pub type SharedStore<S> = Arc<Mutex<S>>;

pub fn shared<S: DataStore>(store: S) -> SharedStore<S> {
    Arc::new(Mutex::new(store))
}

/// Half-open time window `[start, end)` used by the bucketed upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Outcome of [`DataStore::upsert_item`].
#[derive(Debug, Clone, PartialEq)]
pub enum Upserted {
    /// No item shared the bucket; a new record was written.
    Inserted(ScanItem),
    /// An item already occupied the bucket. `changed` tells whether label/meta were rewritten.
    Merged { item: ScanItem, changed: bool },
}

impl Upserted {
    pub fn item(&self) -> &ScanItem {
        match self {
            Upserted::Inserted(item) => item,
            Upserted::Merged { item, .. } => item,
        }
    }

    pub fn into_item(self) -> ScanItem {
        match self {
            Upserted::Inserted(item) => item,
            Upserted::Merged { item, .. } => item,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, Upserted::Inserted(_))
    }
}

/// Durable storage for lists and scan items.
pub trait DataStore {
    // --- Lists ---

    /// Create and persist a list. Fails validation if the trimmed name is empty.
    fn create_list(&mut self, name: &str) -> Result<ScanList>;

    /// Persist changes to an existing list (e.g. its metadata)
    fn save_list(&mut self, list: &ScanList) -> Result<()>;

    /// All lists, newest first
    fn list_all_lists(&self) -> Result<Vec<ScanList>>;

    /// Look a list up by name. With duplicate names, the newest wins.
    fn find_list_by_name(&self, name: &str) -> Result<Option<ScanList>>;

    fn find_list(&self, id: &Uuid) -> Result<Option<ScanList>>;

    /// Remove a list record. Items referencing it by name are kept.
    fn delete_list(&mut self, id: &Uuid) -> Result<()>;

    fn rename_list(&mut self, id: &Uuid, new_name: &str) -> Result<ScanList>;

    // --- Items ---

    /// Insert an item as-is (a store-assigned `seq` replaces the given one)
    fn insert_item(&mut self, item: &ScanItem) -> Result<ScanItem>;

    /// Items of one list, newest first
    fn find_items(&self, list_id: &str) -> Result<Vec<ScanItem>>;

    fn find_item(&self, id: &Uuid) -> Result<Option<ScanItem>>;

    /// Set or clear the label. `at` is the edit time on the caller's clock; it
    /// becomes `updated_at` unless that is already later.
    fn update_item_label(
        &mut self,
        id: &Uuid,
        label: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<ScanItem>;

    fn delete_item(&mut self, id: &Uuid) -> Result<()>;

    /// Insert `draft`, or merge it into the item with the same
    /// `(list_id, code_raw, code_type)` whose `created_at` falls in `window`.
    fn upsert_item(&mut self, draft: ItemDraft, window: Window) -> Result<Upserted>;

    /// Where the store keeps its data
    fn location(&self) -> PathBuf;
}

pub(crate) fn not_found_list(id: &Uuid) -> ScanError {
    ScanError::ListNotFound(id.to_string())
}
