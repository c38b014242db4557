//! Claim issuance.
//!
//! Builds the claim set embedded in a newly generated token. Issuance trusts
//! the already-authenticated identity and never touches the user repository.

use crate::claims::{ClaimPath, ClaimSet, ClaimsNamespace, CLAIM_EXP, CLAIM_IAT};
use crate::models::Identity;
use std::time::Duration;
use tracing::instrument;

/// Default token lifetime (2 hours).
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// Produces claim sets for authenticated identities.
#[derive(Debug, Clone)]
pub struct ClaimIssuer {
    namespace: ClaimsNamespace,
    realm_url: String,
    lifetime_secs: i64,
}

impl ClaimIssuer {
    /// Create an issuer for one realm.
    ///
    /// Lifetimes beyond `i64::MAX` seconds saturate.
    pub fn new(namespace: ClaimsNamespace, realm_url: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            namespace,
            realm_url: realm_url.into(),
            lifetime_secs: i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issue the claims for `identity` at `now` (epoch seconds).
    ///
    /// `exp - iat` always equals the configured lifetime, unless `now` is so
    /// close to `i64::MAX` that the sum saturates.
    #[instrument(skip_all)]
    pub fn issue(&self, identity: &Identity, now: i64) -> ClaimSet {
        let ns = &self.namespace;

        ClaimSet::builder()
            .claim(ClaimPath::standard(CLAIM_IAT), now)
            .claim(
                ClaimPath::standard(CLAIM_EXP),
                now.saturating_add(self.lifetime_secs),
            )
            .claim(ns.uid(), identity.id.0)
            .claim(ns.name(), identity.name.clone())
            .claim(ns.roles(), identity.roles.clone())
            .claim(ns.url(), self.realm_url.clone())
            .build()
    }
}
