//! Typed claim sets extracted from verified tokens.
//!
//! A [`ClaimSet`] is a plain mapping from claim type to value(s). Locally
//! issued tokens and external identity-provider tokens both reduce to this
//! shape, so the provisioning service never inspects raw JWTs.

use std::collections::HashMap;

use serde_json::Value;

use crate::domain::Role;

/// Claim types that carry role assignments, in resolution order.
const ROLE_CLAIMS: &[&str] = &["role", "roles"];

/// Claim-type to value(s) mapping from a verified token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet(HashMap<String, Vec<String>>);

impl ClaimSet {
    /// Empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a decoded JWT payload object into a claim set.
    ///
    /// String claims map to a single value; string arrays map to one value
    /// per element; numbers and booleans are stringified; nested objects
    /// and nulls are dropped.
    pub fn from_json(payload: &Value) -> Self {
        let mut claims = HashMap::new();
        if let Some(object) = payload.as_object() {
            for (claim, value) in object {
                let values = match value {
                    Value::String(s) => vec![s.clone()],
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_owned))
                        .collect(),
                    Value::Number(n) => vec![n.to_string()],
                    Value::Bool(b) => vec![b.to_string()],
                    Value::Null | Value::Object(_) => continue,
                };
                if !values.is_empty() {
                    claims.insert(claim.clone(), values);
                }
            }
        }
        Self(claims)
    }

    /// Add a claim value, appending when the claim already exists.
    pub fn push(&mut self, claim: impl Into<String>, value: impl Into<String>) {
        self.0.entry(claim.into()).or_default().push(value.into());
    }

    /// Builder-style [`ClaimSet::push`].
    #[must_use]
    pub fn with(mut self, claim: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(claim, value);
        self
    }

    /// First non-blank value of a claim.
    pub fn first(&self, claim: &str) -> Option<&str> {
        self.0
            .get(claim)?
            .iter()
            .map(String::as_str)
            .find(|value| !value.trim().is_empty())
    }

    /// First non-blank value among several claim types, in order.
    pub fn first_of<'a>(&'a self, claims: &[&str]) -> Option<&'a str> {
        claims.iter().find_map(|claim| self.first(claim))
    }

    /// All values of a claim, in insertion order.
    pub fn values(&self, claim: &str) -> impl Iterator<Item = &str> {
        self.0.get(claim).into_iter().flatten().map(String::as_str)
    }

    /// Whether any role claim value grants the given role.
    ///
    /// Role values may arrive as an array claim or as a single
    /// space-separated string; comparison ignores ASCII case.
    pub fn has_role(&self, role: Role) -> bool {
        ROLE_CLAIMS.iter().any(|claim| {
            self.values(claim)
                .flat_map(|value| value.split(' '))
                .filter(|value| !value.is_empty())
                .any(|value| value.eq_ignore_ascii_case(role.as_str()))
        })
    }
}
