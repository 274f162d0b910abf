//! Configuration for the secure repository layer.

/// Tunables for the security-gated facades.
#[derive(Debug, Clone)]
pub struct SecureConfig {
    /// Max operations per caller per window (default: 100).
    pub rate_limit_max: u32,
    /// Rate-limit window length in seconds (default: 60).
    pub rate_limit_window_secs: u64,
    /// Row cap for export fetches; effectively unbounded for any real
    /// wedding (default: 100_000).
    pub export_limit: u64,
    /// Row cap for assistant free-text searches (default: 50).
    pub search_limit: u64,
}

impl Default for SecureConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: 100,
            rate_limit_window_secs: 60,
            export_limit: 100_000,
            search_limit: 50,
        }
    }
}
