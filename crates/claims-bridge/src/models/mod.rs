use crate::claims::ClaimValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable account identifier (maps to `users.user_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Read an id out of a claim value.
    ///
    /// Tokens minted by this service carry an integer, but identity providers
    /// that stringify ids (`"42"`) are accepted as well. Only the canonical
    /// decimal form is read, so `"+42"` and `"042"` name no account.
    pub fn from_claim(value: &ClaimValue) -> Option<Self> {
        match value {
            ClaimValue::Integer(n) => Some(UserId(*n)),
            ClaimValue::String(s) => s
                .parse::<i64>()
                .ok()
                .filter(|n| n.to_string() == *s)
                .map(UserId),
            _ => None,
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated caller at token-issuance time.
///
/// The realm URL is not part of the identity; it is configuration injected
/// into the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub roles: Vec<String>,
}

/// User account (maps to users table).
///
/// This is the principal bound to a session once a token has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    #[sqlx(try_from = "i64")]
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The repository-authoritative identity bound to an authenticated session.
pub type Principal = Account;

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Identity {
            id: account.user_id,
            name: account.name.clone(),
            roles: account.roles.clone(),
        }
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId(value)
    }
}

/// Token response returned to the caller after issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Session description returned by `GET /api/v1/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: UserId,
    pub name: String,
    pub roles: Vec<String>,
}

impl From<&Account> for SessionResponse {
    fn from(account: &Account) -> Self {
        SessionResponse {
            user_id: account.user_id,
            name: account.name.clone(),
            roles: account.roles.clone(),
        }
    }
}
