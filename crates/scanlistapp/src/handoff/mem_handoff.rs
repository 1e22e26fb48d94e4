use super::backend::HandoffBackend;
use crate::error::{Result, ScanError};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory handoff region for tests.
///
/// `set_available(false)` makes every call fail the way an unreachable shared
/// directory would.
#[derive(Debug)]
pub struct MemHandoff {
    values: Mutex<HashMap<String, String>>,
    available: Mutex<bool>,
}

impl Default for MemHandoff {
    fn default() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            available: Mutex::new(true),
        }
    }
}

impl MemHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }

    /// Raw value of `key`, bypassing availability
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn check(&self) -> Result<()> {
        if !*self.available.lock() {
            return Err(ScanError::ChannelUnavailable("simulated outage".into()));
        }
        Ok(())
    }
}

impl HandoffBackend for MemHandoff {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.values.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.values.lock().remove(key);
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.values.lock().remove(key))
    }

    fn describe(&self) -> String {
        "memory://handoff".to_string()
    }
}
