//! Shared validation helpers for inbound HTTP adapters.
//!
//! Rules accumulate per-field messages so a response reports every failing
//! field at once, as `details.errors` keyed by the JSON field name.

use std::collections::BTreeMap;

use serde_json::json;

use crate::domain::{CAPACITY_RANGE, Error};

/// Accumulator for per-field validation failures.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Value must contain at least one non-whitespace character.
    pub(crate) fn require_non_empty(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("{field} must not be empty"));
        }
    }

    /// Value must be at least `min` characters after trimming.
    pub(crate) fn require_min_len(&mut self, field: &'static str, value: &str, min: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, format!("{field} must not be empty"));
        } else if trimmed.chars().count() < min {
            self.push(field, format!("{field} must be at least {min} characters"));
        }
    }

    /// Value must look like an email address: one `@` with a non-empty
    /// local part and a domain containing a dot.
    pub(crate) fn require_email(&mut self, field: &'static str, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, format!("{field} must not be empty"));
            return;
        }
        let valid = match trimmed.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !trimmed.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            self.push(field, format!("{field} must be a valid email address"));
        }
    }

    /// Capacity must fall inside the supported range.
    pub(crate) fn require_capacity(&mut self, field: &'static str, value: i64) {
        if !CAPACITY_RANGE.contains(&value) {
            self.push(
                field,
                format!(
                    "{field} must be between {} and {}",
                    CAPACITY_RANGE.start(),
                    CAPACITY_RANGE.end()
                ),
            );
        }
    }

    /// Resolve to an error carrying every accumulated message.
    pub(crate) fn finish(self) -> Result<(), Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(
                Error::invalid_request("One or more validation errors occurred.")
                    .with_details(json!({ "errors": self.errors })),
            )
        }
    }
}
