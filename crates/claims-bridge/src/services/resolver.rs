//! Principal resolution.
//!
//! Loads the authoritative account named by the id claim. The resolver does
//! not assume the validator already ran: a missing id or unknown account is a
//! failure here too. It does not re-check the name.

use crate::claims::{ClaimSet, ClaimsNamespace};
use crate::errors::BridgeError;
use crate::models::{Principal, UserId};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_principal_resolution;
use crate::repositories::UserRepository;
use std::fmt;
use tracing::instrument;

/// Why no principal could be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// The id claim is absent or not an id.
    MissingId,
    /// No account exists for the id claim.
    AccountNotFound,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionFailure::MissingId => f.write_str("id claim missing from payload"),
            ResolutionFailure::AccountNotFound => f.write_str("specified id does not exist"),
        }
    }
}

/// Result of resolving one claim set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The session is bound to this account.
    Bound(Principal),
    /// The session must be treated as unauthenticated.
    Unauthenticated(ResolutionFailure),
}

/// Loads the principal for an accepted claim set.
#[derive(Debug, Clone, Default)]
pub struct PrincipalResolver {
    namespace: ClaimsNamespace,
}

impl PrincipalResolver {
    pub fn new(namespace: ClaimsNamespace) -> Self {
        Self { namespace }
    }

    #[instrument(skip_all, name = "bridge.resolve")]
    pub async fn resolve(
        &self,
        claims: &ClaimSet,
        repo: &dyn UserRepository,
    ) -> Result<Resolution, BridgeError> {
        let Some(uid) = claims
            .get(&self.namespace.uid())
            .and_then(UserId::from_claim)
        else {
            record_principal_resolution("unauthenticated");
            return Ok(Resolution::Unauthenticated(ResolutionFailure::MissingId));
        };

        match repo.find_by_id(uid).await? {
            Some(account) => {
                tracing::debug!(
                    target: "bridge.resolver",
                    user = %hash_for_correlation(&uid.to_string()),
                    "Principal bound to session"
                );
                record_principal_resolution("bound");
                Ok(Resolution::Bound(account))
            }
            None => {
                record_principal_resolution("unauthenticated");
                Ok(Resolution::Unauthenticated(
                    ResolutionFailure::AccountNotFound,
                ))
            }
        }
    }
}
