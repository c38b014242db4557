//! User repository: the live identity store that token claims are checked against.
//!
//! `find_by_id` returns `Ok(None)` for an unknown id. `Err` is reserved for a
//! failed fetch, which callers propagate unchanged.

use crate::errors::BridgeError;
use crate::models::{Account, UserId};
use sqlx::PgPool;

/// Account lookup used by the validator and the resolver.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Load an account by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, BridgeError>;
}

/// Postgres-backed repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, BridgeError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT user_id, name, email, roles, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| BridgeError::Database(format!("Failed to fetch user by id: {}", e)))?;

        Ok(account)
    }
}

/// In-memory repository for tests and local runs.
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// Map-backed repository with call counting and a failure mode.
    #[derive(Default)]
    pub struct InMemoryUserRepository {
        accounts: RwLock<HashMap<UserId, Account>>,
        lookups: AtomicUsize,
        fail: bool,
    }

    impl InMemoryUserRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// A repository whose every lookup fails with a database error.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Insert (or replace) an account and return it.
        pub async fn insert(&self, id: i64, name: &str, roles: &[&str]) -> Account {
            let account = Account {
                user_id: UserId(id),
                name: name.to_string(),
                email: None,
                roles: roles.iter().map(ToString::to_string).collect(),
                created_at: Utc::now(),
            };
            self.accounts
                .write()
                .await
                .insert(account.user_id, account.clone());
            account
        }

        /// Change an account's display name. Returns false if it doesn't exist.
        pub async fn rename(&self, id: i64, name: &str) -> bool {
            match self.accounts.write().await.get_mut(&UserId(id)) {
                Some(account) => {
                    account.name = name.to_string();
                    true
                }
                None => false,
            }
        }

        pub async fn remove(&self, id: i64) -> Option<Account> {
            self.accounts.write().await.remove(&UserId(id))
        }

        /// Number of `find_by_id` calls made so far.
        pub fn lookup_count(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, BridgeError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                return Err(BridgeError::Database(
                    "Mock user repository error".to_string(),
                ));
            }

            Ok(self.accounts.read().await.get(&id).cloned())
        }
    }
}
