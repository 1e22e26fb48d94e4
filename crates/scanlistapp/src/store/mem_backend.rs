use super::backend::StorageBackend;
use crate::error::{Result, ScanError};
use crate::model::{ScanItem, ScanList};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability: the store is only ever touched
/// through the `SharedStore` mutex, so no finer-grained locking is needed here.
#[derive(Default)]
pub struct MemBackend {
    lists: RefCell<HashMap<Uuid, ScanList>>,
    items: RefCell<HashMap<Uuid, ScanItem>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(ScanError::Persistence("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    // Nothing outside this process can see the data
    type Guard = ();

    fn lock(&self) -> Result<()> {
        Ok(())
    }

    fn load_lists(&self) -> Result<HashMap<Uuid, ScanList>> {
        Ok(self.lists.borrow().clone())
    }

    fn save_lists(&self, lists: &HashMap<Uuid, ScanList>) -> Result<()> {
        self.check_writable()?;
        *self.lists.borrow_mut() = lists.clone();
        Ok(())
    }

    fn load_items(&self) -> Result<HashMap<Uuid, ScanItem>> {
        Ok(self.items.borrow().clone())
    }

    fn save_items(&self, items: &HashMap<Uuid, ScanItem>) -> Result<()> {
        self.check_writable()?;
        *self.items.borrow_mut() = items.clone();
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://scanlist")
    }
}
