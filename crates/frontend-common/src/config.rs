//! Store configuration

/// Store timing constants
pub struct StoreConfig;

impl StoreConfig {
    /// How long a toast stays visible, in milliseconds
    pub const TOAST_TIMEOUT_MS: u64 = 4_000;

    /// Redirects followed for one navigation before giving up
    pub const MAX_REDIRECTS: usize = 8;
}
