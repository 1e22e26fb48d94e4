use crate::error::Result;
use crate::model::{ScanItem, ScanList};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while ScanStore handles the "what" (validation, ordering, dedup).
pub trait StorageBackend {
    /// Held for the duration of a read-modify-write; dropping it releases the lock.
    type Guard;

    /// Exclusive write access to the stored data.
    /// Every process sharing the same storage MUST be excluded, not just this handle.
    fn lock(&self) -> Result<Self::Guard>;

    // --- List Operations ---

    /// Load the list index (lists.json)
    fn load_lists(&self) -> Result<HashMap<Uuid, ScanList>>;

    /// Save the list index.
    /// MUST replace the previous index atomically.
    fn save_lists(&self, lists: &HashMap<Uuid, ScanList>) -> Result<()>;

    // --- Item Operations ---

    /// Load all scan items (items.json)
    fn load_items(&self) -> Result<HashMap<Uuid, ScanItem>>;

    /// Save all scan items.
    /// MUST replace the previous file atomically so readers never see a torn write.
    fn save_items(&self, items: &HashMap<Uuid, ScanItem>) -> Result<()>;

    // --- Paths ---

    /// Where the data lives. For FsBackend, the data directory; for MemBackend, a virtual path.
    fn location(&self) -> PathBuf;
}
