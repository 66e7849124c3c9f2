//! Common types shared across OneView resources.
//!
//! This module defines the untyped resource representation, the collection
//! envelope used by every list endpoint, and the PATCH operation body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An open-ended resource representation.
///
/// OneView resources carry many type-specific fields; the client does not
/// enforce a schema. Key order is preserved as received or inserted.
pub type Resource = Map<String, Value>;

/// Overlays caller-supplied values on top of per-facade defaults.
///
/// Caller values win on key collision; defaults only fill missing keys.
pub fn merge_defaults(defaults: &Resource, resource: &Resource) -> Resource {
    let mut data = defaults.clone();
    for (key, value) in resource {
        data.insert(key.clone(), value.clone());
    }
    data
}

/// Returns the `uri` field of a representation, if present and non-empty.
pub fn resource_uri(resource: &Resource) -> Option<&str> {
    resource
        .get("uri")
        .and_then(Value::as_str)
        .filter(|uri| !uri.is_empty())
}

/// A page of a collection endpoint.
///
/// A missing `members` key is an empty page, never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Entities on this page.
    pub members: Vec<Value>,

    /// Address of the next page, when the server reports one.
    pub next_page_uri: Option<String>,
}

impl Collection {
    /// Reads a collection envelope from a response body.
    ///
    /// Tolerates bodies that are not objects, a missing or non-array
    /// `members`, and a `nextPageUri` that is null or empty.
    pub fn from_value(body: &Value) -> Self {
        let members = body
            .get("members")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let next_page_uri = body
            .get("nextPageUri")
            .and_then(Value::as_str)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string);

        Self {
            members,
            next_page_uri,
        }
    }

    /// Takes the member list out of a response body.
    pub fn members_of(body: &Value) -> Vec<Value> {
        Self::from_value(body).members
    }
}

/// A single JSON-PATCH style operation.
///
/// OneView accepts exactly one operation per PATCH call; the request body is
/// a one-element list of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchOperation {
    /// The operation, e.g. `replace`.
    pub op: String,

    /// Attribute path, e.g. `/templateCompliance`.
    pub path: String,

    /// New value.
    pub value: Value,
}

impl PatchOperation {
    /// Creates a patch operation.
    pub fn new(op: impl Into<String>, path: impl Into<String>, value: Value) -> Self {
        Self {
            op: op.into(),
            path: path.into(),
            value,
        }
    }

    /// Wraps this operation in the single-element list the API expects.
    pub fn into_body(self) -> Value {
        Value::Array(vec![serde_json::json!({
            "op": self.op,
            "path": self.path,
            "value": self.value,
        })])
    }
}
