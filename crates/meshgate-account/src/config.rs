//! Account manager configuration.

use std::time::Duration;

/// Configuration for the account manager.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    /// Maximum time to wait for an account lock, in seconds. `None`
    /// waits indefinitely. A timed-out call fails before touching
    /// any state.
    pub lock_timeout_secs: Option<u64>,
}

impl ManagerConfig {
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_secs.map(Duration::from_secs)
    }
}
