//! Content-addressed cache-key derivation.
//!
//! The key for a cached response is the lowercase hex SHA-256 digest of the
//! exact query text under the `overpass:` namespace. Identical text maps to
//! the same entry; textually different but semantically equivalent queries
//! are deliberately distinct. Normalising Overpass QL is not worth the
//! false-sharing risk.

use sha2::{Digest, Sha256};

/// Namespace prefix keeping these entries clear of unrelated cached data.
pub const KEY_PREFIX: &str = "overpass:";

/// Derive the cache key for a query. Pure: equal inputs always yield equal
/// keys.
pub fn cache_key(query: &str) -> String {
    let digest = Sha256::digest(query.as_bytes());
    format!("{KEY_PREFIX}{digest:x}")
}
