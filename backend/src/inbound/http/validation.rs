//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers collect every field problem of a payload before answering, so
//! a single `400` names all offending fields.

use serde_json::{Value, json};

use crate::domain::DomainError;
use crate::domain::records::RecordId;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    MissingField,
    BlankField,
    InvalidUuid,
}

impl ValidationCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::BlankField => "blank_field",
            Self::InvalidUuid => "invalid_uuid",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::MissingField => "missing required field",
            Self::BlankField => "must not be blank",
            Self::InvalidUuid => "must be a valid UUID",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldError {
    field: FieldName,
    code: ValidationCode,
    value: Option<String>,
}

impl FieldError {
    fn to_json(&self) -> Value {
        let mut entry = json!({
            "field": self.field.as_str(),
            "code": self.code.as_str(),
            "message": self.code.message(),
        });
        if let (Some(value), Some(object)) = (&self.value, entry.as_object_mut()) {
            object.insert("value".to_owned(), Value::String(value.clone()));
        }
        entry
    }
}

/// Accumulates field errors for one payload.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: FieldName, code: ValidationCode, value: Option<String>) {
        self.errors.push(FieldError { field, code, value });
    }

    /// Returns the trimmed text, recording an error when it is absent or blank.
    pub(crate) fn require_text(
        &mut self,
        field: FieldName,
        value: Option<String>,
    ) -> Option<String> {
        let Some(raw) = value else {
            self.push(field, ValidationCode::MissingField, None);
            return None;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.push(field, ValidationCode::BlankField, None);
            return None;
        }
        Some(trimmed.to_owned())
    }

    /// Parses a record id, recording an error when it is absent or malformed.
    pub(crate) fn require_id(&mut self, field: FieldName, value: Option<String>) -> Option<RecordId> {
        let Some(raw) = value else {
            self.push(field, ValidationCode::MissingField, None);
            return None;
        };
        match raw.trim().parse::<RecordId>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(field, ValidationCode::InvalidUuid, Some(raw));
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Builds the `Bad Request` error listing every recorded field.
    pub(crate) fn into_error(self) -> DomainError {
        let summary = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field.as_str(), error.code.message()))
            .collect::<Vec<_>>()
            .join("; ");
        let fields: Vec<Value> = self.errors.iter().map(FieldError::to_json).collect();
        DomainError::invalid_request(summary).with_details(json!({ "fields": fields }))
    }
}
