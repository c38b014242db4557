//! Token assertions.
//!
//! These inspect the compact JWT directly (no signature check) so a failing
//! test shows what the bridge actually put on the wire.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no segment {}", index));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e))
}

fn payload(token: &str) -> Value {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT payload")
}

/// Look up a dotted path such as `app.name` in the payload.
fn lookup<'a>(payload: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(payload, |node, key| node.get(key))
}

/// Custom assertions for bridge tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by("test-key-2025-01")
///     .assert_has_claim("app.name", "alice")
///     .assert_expires_in(7200);
/// ```
pub trait TokenAssertions {
    /// Three segments, EdDSA/JWT header, integer `iat` and `exp`.
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// `exp` is `seconds` from now, within 5 seconds.
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// The claim at the dotted path equals `expected`.
    fn assert_has_claim(&self, path: &str, expected: impl Into<Value>) -> &Self;

    fn assert_lacks_claim(&self, path: &str) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header: JwtHeader =
            serde_json::from_slice(&segment(self, 0)).expect("Failed to parse JWT header JSON");
        assert_eq!(header.alg, "EdDSA", "Expected EdDSA algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims = payload(self);
        assert!(claims["iat"].is_i64(), "iat must be an integer: {}", claims);
        assert!(claims["exp"].is_i64(), "exp must be an integer: {}", claims);

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header: JwtHeader =
            serde_json::from_slice(&segment(self, 0)).expect("Failed to parse JWT header");

        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );

        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let exp = payload(self)["exp"].as_i64().expect("exp must be an integer");
        let expires_in = exp - chrono::Utc::now().timestamp();

        assert!(
            (expires_in - seconds as i64).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_has_claim(&self, path: &str, expected: impl Into<Value>) -> &Self {
        let claims = payload(self);
        let expected = expected.into();

        assert_eq!(
            lookup(&claims, path),
            Some(&expected),
            "Claim '{}' mismatch in payload {}",
            path,
            claims
        );

        self
    }

    fn assert_lacks_claim(&self, path: &str) -> &Self {
        let claims = payload(self);

        assert!(
            lookup(&claims, path).is_none(),
            "Claim '{}' should be absent from payload {}",
            path,
            claims
        );

        self
    }
}
