use crate::error::Result;

/// Raw key/value access to the region shared between cooperating processes.
///
/// Values are opaque JSON documents. Every method takes `&self`: both sides of
/// the handoff may hold the backend at once, so implementations synchronize
/// internally (the filesystem does it for `FsHandoff`).
///
/// Failures are reported as `ScanError::ChannelUnavailable`.
pub trait HandoffBackend: Send + Sync {
    /// Current value of `key`, or `None` if it was never written or has been cleared
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value of `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Atomically read and remove `key`.
    ///
    /// When two callers race, at most one of them gets the value.
    fn take(&self, key: &str) -> Result<Option<String>>;

    /// Human-readable location, for diagnostics
    fn describe(&self) -> String;
}
