//! # Claims Bridge Test Utilities
//!
//! - Deterministic signing keys (fixed seeds for reproducible tokens)
//! - Claim set builders (`TestClaimsBuilder`)
//! - Server harness (`TestBridgeServer` on an in-memory repository)
//! - Fixed test ids
//! - Token assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use claims_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestBridgeServer::spawn().await?;
//!     let alice = server.repo().insert(TEST_USER_ALICE, "alice", &["editor"]).await;
//!
//!     let token = server.token_for(&alice)?;
//!     token.assert_valid_jwt().assert_has_claim("app.name", "alice");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod claim_builders;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod test_ids;

pub use assertions::*;
pub use claim_builders::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
