//! Observability for the claims bridge.
//!
//! All phases are instrumented with `#[instrument(skip_all)]` and only
//! allow-listed fields. User ids are never logged in plaintext; they go
//! through [`hash_for_correlation`] so log lines for one account can still be
//! correlated. Names, role lists and raw tokens are never logged.

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}
