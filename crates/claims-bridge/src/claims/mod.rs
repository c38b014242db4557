//! Claim sets carried by bridge tokens.
//!
//! A [`ClaimSet`] maps a [`ClaimPath`] (a short sequence of segments such as
//! `["app", "uid"]`) to a [`ClaimValue`]. Standard claims (`iat`, `exp`) live
//! at the top level; application claims live under one [`ClaimsNamespace`].
//!
//! A claim set has no mutating methods. It is assembled once through
//! [`ClaimSetBuilder`] and only read afterwards.
//!
//! The wire shape (nested JSON objects) is implemented in [`wire`].

pub mod wire;

pub use wire::WireError;

use std::collections::BTreeMap;
use std::fmt;

/// Issued-at claim name (integer epoch seconds).
pub const CLAIM_IAT: &str = "iat";

/// Expiry claim name (integer epoch seconds).
pub const CLAIM_EXP: &str = "exp";

/// Default top-level key for application claims.
pub const DEFAULT_NAMESPACE: &str = "app";

const UID_KEY: &str = "uid";
const NAME_KEY: &str = "name";
const ROLES_KEY: &str = "roles";
const URL_KEY: &str = "url";

/// Location of a claim inside the token payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimPath(Vec<String>);

impl ClaimPath {
    /// Build a path from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// A top-level (standard) claim such as `iat`.
    pub fn standard(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ClaimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A single claim value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    /// Ordered list of strings; order and duplicates are preserved.
    List(Vec<String>),
}

impl ClaimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ClaimValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::String(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::String(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Integer(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Boolean(value)
    }
}

impl From<Vec<String>> for ClaimValue {
    fn from(value: Vec<String>) -> Self {
        ClaimValue::List(value)
    }
}

/// The full collection of claims carried by one token.
///
/// Entries are kept sorted by path, which is also the order the JSON wire
/// form produces on decode, so a decode of an encode yields an equal set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: BTreeMap<ClaimPath, ClaimValue>,
}

impl ClaimSet {
    pub fn builder() -> ClaimSetBuilder {
        ClaimSetBuilder::default()
    }

    pub fn get(&self, path: &ClaimPath) -> Option<&ClaimValue> {
        self.claims.get(path)
    }

    pub fn contains(&self, path: &ClaimPath) -> bool {
        self.claims.contains_key(path)
    }

    /// The `iat` claim, if present as an integer.
    pub fn issued_at(&self) -> Option<i64> {
        self.get(&ClaimPath::standard(CLAIM_IAT))
            .and_then(ClaimValue::as_i64)
    }

    /// The `exp` claim, if present as an integer.
    pub fn expires_at(&self) -> Option<i64> {
        self.get(&ClaimPath::standard(CLAIM_EXP))
            .and_then(ClaimValue::as_i64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClaimPath, &ClaimValue)> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Start a new builder seeded with this set's claims.
    ///
    /// The original set is left untouched.
    pub fn to_builder(&self) -> ClaimSetBuilder {
        ClaimSetBuilder {
            claims: self.claims.clone(),
        }
    }
}

/// Custom Debug that only shows standard claim values.
///
/// Application claims carry user identifiers and names, which must not end up
/// in logs through `{:?}`.
impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (path, value) in &self.claims {
            match path.segments() {
                [name] if name == CLAIM_IAT || name == CLAIM_EXP => {
                    map.entry(&path.to_string(), value);
                }
                _ => {
                    map.entry(&path.to_string(), &"[REDACTED]");
                }
            }
        }
        map.finish()
    }
}

/// Assembles a [`ClaimSet`].
#[derive(Debug, Default)]
pub struct ClaimSetBuilder {
    claims: BTreeMap<ClaimPath, ClaimValue>,
}

impl ClaimSetBuilder {
    /// Set a claim, replacing any previous value at the same path.
    pub fn claim(mut self, path: ClaimPath, value: impl Into<ClaimValue>) -> Self {
        self.claims.insert(path, value.into());
        self
    }

    /// Drop a claim if present.
    pub fn without(mut self, path: &ClaimPath) -> Self {
        self.claims.remove(path);
        self
    }

    pub fn build(self) -> ClaimSet {
        ClaimSet {
            claims: self.claims,
        }
    }
}

/// Top-level key under which the four application claims are nested.
///
/// Issuer, validator and resolver are all built from the same namespace so
/// they agree on the paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsNamespace(String);

impl ClaimsNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the name would collide with a standard claim.
    pub fn is_reserved(name: &str) -> bool {
        name == CLAIM_IAT || name == CLAIM_EXP
    }

    pub fn uid(&self) -> ClaimPath {
        self.path(UID_KEY)
    }

    pub fn name(&self) -> ClaimPath {
        self.path(NAME_KEY)
    }

    pub fn roles(&self) -> ClaimPath {
        self.path(ROLES_KEY)
    }

    pub fn url(&self) -> ClaimPath {
        self.path(URL_KEY)
    }

    fn path(&self, key: &str) -> ClaimPath {
        ClaimPath::new([self.0.as_str(), key])
    }
}

impl Default for ClaimsNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
