//! Builders for test claim sets.

use crate::test_ids::{TEST_REALM_URL, TEST_USER_ALICE};
use chrono::Utc;
use claims_bridge::claims::{ClaimPath, ClaimSet, ClaimValue, ClaimsNamespace, CLAIM_EXP, CLAIM_IAT};
use claims_bridge::crypto::TokenCodec;

/// Builder for hand-made claim sets, including malformed ones.
///
/// # Example
/// ```rust,ignore
/// let token = TestClaimsBuilder::new()
///     .for_user(TEST_USER_ALICE, "alice")
///     .expires_in(-60)
///     .sign(&codec);
/// ```
pub struct TestClaimsBuilder {
    namespace: ClaimsNamespace,
    uid: ClaimValue,
    name: String,
    roles: Vec<String>,
    url: String,
    iat: i64,
    exp: i64,
    omitted: Vec<ClaimPath>,
}

impl TestClaimsBuilder {
    /// Alice, no roles, issued now, valid for an hour.
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            namespace: ClaimsNamespace::default(),
            uid: ClaimValue::Integer(TEST_USER_ALICE),
            name: "alice".to_string(),
            roles: Vec::new(),
            url: TEST_REALM_URL.to_string(),
            iat: now,
            exp: now + 3600,
            omitted: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = ClaimsNamespace::new(namespace);
        self
    }

    pub fn for_user(mut self, id: i64, name: &str) -> Self {
        self.uid = ClaimValue::Integer(id);
        self.name = name.to_string();
        self
    }

    /// Put the id in as a string, as some issuers do.
    pub fn with_string_uid(mut self, id: &str) -> Self {
        self.uid = ClaimValue::String(id.to_string());
        self
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Set expiration in seconds from now. Negative values give an expired token.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() + seconds;
        self
    }

    /// Leave out one application claim: `uid`, `name`, `roles` or `url`.
    pub fn without(mut self, claim: &str) -> Self {
        let path = match claim {
            "uid" => self.namespace.uid(),
            "name" => self.namespace.name(),
            "roles" => self.namespace.roles(),
            "url" => self.namespace.url(),
            other => ClaimPath::standard(other),
        };
        self.omitted.push(path);
        self
    }

    pub fn build(self) -> ClaimSet {
        let ns = &self.namespace;
        let mut builder = ClaimSet::builder()
            .claim(ClaimPath::standard(CLAIM_IAT), self.iat)
            .claim(ClaimPath::standard(CLAIM_EXP), self.exp)
            .claim(ns.uid(), self.uid.clone())
            .claim(ns.name(), self.name.clone())
            .claim(ns.roles(), self.roles.clone())
            .claim(ns.url(), self.url.clone());

        for path in &self.omitted {
            builder = builder.without(path);
        }

        builder.build()
    }

    /// Build and sign with `codec`.
    pub fn sign(self, codec: &TokenCodec) -> String {
        codec
            .encode(&self.build())
            .expect("Failed to sign test claims")
    }
}

impl Default for TestClaimsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
