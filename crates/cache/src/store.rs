//! The cache store seam.

use async_trait::async_trait;

/// Errors from a cache backend.
///
/// Callers treat these as soft failures: a `get` error is a miss, a `set`
/// error is logged and swallowed. The variants exist so backends can report
/// what actually went wrong.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached or answered with a transport error.
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but the operation itself failed.
    #[error("Cache operation failed: {0}")]
    Operation(String),
}

/// String-keyed cache with per-entry time-to-live.
///
/// Values are opaque serialized strings; key derivation and serialization
/// belong to the caller. Single-key atomicity is all that is required of a
/// backend: racing writers for the same key are a benign last-write-wins
/// overwrite.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a live entry. `Ok(None)` is a miss; expired entries are
    /// misses too.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value for `ttl_seconds`. Overwrites any existing entry.
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> Result<(), CacheError>;
}
