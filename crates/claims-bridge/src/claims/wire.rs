//! Nested JSON wire shape of a claim set.
//!
//! `["app", "uid"] => 42` is written as `{"app": {"uid": 42}}`. Decoding walks
//! nested objects back into paths. `null` leaves are treated as absent so that
//! "present but null" and "missing" are indistinguishable to the validator.

use super::{ClaimPath, ClaimSet, ClaimValue};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors converting between a [`ClaimSet`] and its JSON payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("claim path is empty")]
    EmptyPath,

    /// One claim path is a prefix of another, so both cannot be nested.
    #[error("claim path conflicts with another claim: {0}")]
    PathConflict(String),

    #[error("unsupported claim value at {0}")]
    UnsupportedValue(String),

    #[error("claim payload is not a JSON object")]
    NotAnObject,
}

impl ClaimValue {
    fn to_json(&self) -> Value {
        match self {
            ClaimValue::String(s) => Value::String(s.clone()),
            ClaimValue::Integer(n) => Value::from(*n),
            ClaimValue::Boolean(b) => Value::Bool(*b),
            ClaimValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// Map a JSON leaf onto a claim value. Floats, nested arrays and arrays of
    /// non-strings have no claim representation.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ClaimValue::String(s.clone())),
            Value::Number(n) => n.as_i64().map(ClaimValue::Integer),
            Value::Bool(b) => Some(ClaimValue::Boolean(*b)),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(ToString::to_string))
                .collect::<Option<Vec<_>>>()
                .map(ClaimValue::List),
            Value::Null | Value::Object(_) => None,
        }
    }
}

impl ClaimSet {
    /// Render the claim set as its nested JSON payload.
    pub fn to_json(&self) -> Result<Value, WireError> {
        let mut root = Map::new();
        for (path, value) in self.iter() {
            insert_nested(&mut root, path, value.to_json())?;
        }
        Ok(Value::Object(root))
    }

    /// Rebuild a claim set from a nested JSON payload.
    pub fn from_json(payload: &Value) -> Result<Self, WireError> {
        let object = payload.as_object().ok_or(WireError::NotAnObject)?;

        let mut claims = BTreeMap::new();
        let mut prefix = Vec::new();
        flatten(&mut prefix, object, &mut claims)?;

        Ok(ClaimSet { claims })
    }
}

fn insert_nested(
    root: &mut Map<String, Value>,
    path: &ClaimPath,
    value: Value,
) -> Result<(), WireError> {
    let (leaf, parents) = path.segments().split_last().ok_or(WireError::EmptyPath)?;

    let mut current = root;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(inner) => inner,
            _ => return Err(WireError::PathConflict(path.to_string())),
        };
    }

    if current.contains_key(leaf) {
        return Err(WireError::PathConflict(path.to_string()));
    }
    current.insert(leaf.clone(), value);

    Ok(())
}

fn flatten(
    prefix: &mut Vec<String>,
    object: &Map<String, Value>,
    out: &mut BTreeMap<ClaimPath, ClaimValue>,
) -> Result<(), WireError> {
    for (key, value) in object {
        prefix.push(key.clone());
        match value {
            Value::Object(inner) => flatten(prefix, inner, out)?,
            Value::Null => {}
            leaf => {
                let path = ClaimPath(prefix.clone());
                let claim = ClaimValue::from_json(leaf)
                    .ok_or_else(|| WireError::UnsupportedValue(path.to_string()))?;
                out.insert(path, claim);
            }
        }
        prefix.pop();
    }
    Ok(())
}

impl Serialize for ClaimSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClaimSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let payload = Value::deserialize(deserializer)?;
        ClaimSet::from_json(&payload).map_err(de::Error::custom)
    }
}
