//! Claim validation.
//!
//! Runs after the transport has verified the token signature. Checks that the
//! application claims are present and still agree with the live account, so a
//! correctly signed token issued before a rename (or for a deleted account) is
//! refused.
//!
//! Checks run in order and stop at the first failure:
//! 1. all four application claims present
//! 2. an account exists for the id claim
//! 3. the account's current name equals the name claim
//!
//! Presence is by path only. An id that is not a canonical integer names no
//! account, and a non-string name cannot equal the account name. Roles and
//! realm URL are carried through as-is and not compared against the
//! repository here.

use crate::claims::{ClaimSet, ClaimsNamespace};
use crate::errors::BridgeError;
use crate::models::UserId;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_validation;
use crate::repositories::UserRepository;
use std::fmt;
use tracing::instrument;

/// Why a claim set was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// One of id, name, roles, url is absent.
    MissingClaims,
    /// No account exists for the id claim.
    UnknownAccount,
    /// The account was renamed since the token was issued.
    NameMismatch,
}

impl RejectionReason {
    /// Human-readable reason for logs. Not safe to show end users.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::MissingClaims => "expected data missing from payload",
            RejectionReason::UnknownAccount => "specified id does not exist",
            RejectionReason::NameMismatch => "account name does not match",
        }
    }

    /// Bounded label for metrics.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MissingClaims => "missing_claims",
            RejectionReason::UnknownAccount => "unknown_account",
            RejectionReason::NameMismatch => "name_mismatch",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one claim set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(RejectionReason),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }

    /// The rejection reason text, if rejected.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            ValidationOutcome::Accepted => None,
            ValidationOutcome::Rejected(reason) => Some(reason.as_str()),
        }
    }
}

/// The compared application claims. `None` when present but of the wrong shape.
struct AppClaims<'a> {
    uid: Option<UserId>,
    name: Option<&'a str>,
}

/// Cross-checks decoded claims against the user repository.
#[derive(Debug, Clone, Default)]
pub struct ClaimValidator {
    namespace: ClaimsNamespace,
}

impl ClaimValidator {
    pub fn new(namespace: ClaimsNamespace) -> Self {
        Self { namespace }
    }

    /// Validate `claims` against `repo`.
    ///
    /// Rejections are returned as `Ok(ValidationOutcome::Rejected(_))`; only a
    /// repository fault is an `Err`, and it is propagated unchanged.
    #[instrument(skip_all, name = "bridge.validate")]
    pub async fn validate(
        &self,
        claims: &ClaimSet,
        repo: &dyn UserRepository,
    ) -> Result<ValidationOutcome, BridgeError> {
        let outcome = self.check(claims, repo).await?;

        match outcome {
            ValidationOutcome::Accepted => record_token_validation("accepted", None),
            ValidationOutcome::Rejected(reason) => {
                tracing::debug!(
                    target: "bridge.validator",
                    reason = reason.as_str(),
                    "Token claims rejected"
                );
                record_token_validation("rejected", Some(reason.code()));
            }
        }

        Ok(outcome)
    }

    async fn check(
        &self,
        claims: &ClaimSet,
        repo: &dyn UserRepository,
    ) -> Result<ValidationOutcome, BridgeError> {
        let Some(app) = self.extract(claims) else {
            return Ok(ValidationOutcome::Rejected(RejectionReason::MissingClaims));
        };

        let Some(uid) = app.uid else {
            tracing::debug!(target: "bridge.validator", "Id claim is not an account id");
            return Ok(ValidationOutcome::Rejected(RejectionReason::UnknownAccount));
        };

        let account = match repo.find_by_id(uid).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::debug!(
                    target: "bridge.validator",
                    user = %hash_for_correlation(&uid.to_string()),
                    "No account for id claim"
                );
                return Ok(ValidationOutcome::Rejected(RejectionReason::UnknownAccount));
            }
            Err(e) => {
                record_token_validation("error", None);
                return Err(e);
            }
        };

        if app.name != Some(account.name.as_str()) {
            return Ok(ValidationOutcome::Rejected(RejectionReason::NameMismatch));
        }

        Ok(ValidationOutcome::Accepted)
    }

    fn extract<'a>(&self, claims: &'a ClaimSet) -> Option<AppClaims<'a>> {
        let ns = &self.namespace;

        let uid = claims.get(&ns.uid())?;
        let name = claims.get(&ns.name())?;
        if !claims.contains(&ns.roles()) || !claims.contains(&ns.url()) {
            return None;
        }

        Some(AppClaims {
            uid: UserId::from_claim(uid),
            name: name.as_str(),
        })
    }
}
