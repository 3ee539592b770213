use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::domain::validation::{
    require_consent, validate_email_address, validate_first_name, validate_last_name,
    validate_message, validate_phone,
};
use crate::utils::sanitize::{sanitize_message_html, strip_html, strip_line_breaks};

// ───── Inbound form ──────────────────────────────────────────────────

/// Raw contact form as posted by the browser. Every field defaults so that a
/// missing input surfaces as a field error instead of an extractor failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ContactSubmission {
    #[serde(default)]
    #[validate(custom(function = "validate_last_name"))]
    pub name: String,

    #[serde(default, rename = "firstName")]
    #[validate(custom(function = "validate_first_name"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub tel: String,

    #[serde(default)]
    #[validate(custom(function = "validate_message"))]
    pub message: String,

    /// Hidden from humans, filled by naive bots.
    #[serde(default, rename = "website", skip_serializing_if = "Option::is_none")]
    pub honeypot: Option<String>,

    /// Milliseconds since the epoch, recorded when the form was rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, deserialize_with = "deserialize_checkbox")]
    #[validate(custom(function = "require_consent"))]
    pub consent: bool,
}

impl ContactSubmission {
    pub fn has_honeypot(&self) -> bool {
        self.honeypot.as_deref().is_some_and(|value| !value.is_empty())
    }
}

/// HTML checkboxes post `on` when ticked and nothing otherwise.
fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        raw.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    ))
}

// ───── Validation outcome ────────────────────────────────────────────

/// Field name (as named in the form) to the first failing rule's message.
/// An absent key means the field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult(BTreeMap<String, String>);

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message recorded for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(wire_field_name(field).to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl From<ValidationErrors> for ValidationResult {
    fn from(errors: ValidationErrors) -> Self {
        let mut result = ValidationResult::new();
        for (field, errors) in errors.field_errors() {
            if let Some(error) = errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Valeur invalide".to_string());
                result.add(&field, message);
            }
        }
        result
    }
}

/// Maps struct field names onto the names the form posts.
fn wire_field_name(field: &str) -> &str {
    match field {
        "first_name" => "firstName",
        other => other,
    }
}

// ───── Normalized values ─────────────────────────────────────────────

/// Submission after the schema accepted it: trimmed, email lowercased,
/// phone normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Values safe to place in mail headers and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedContact {
    pub name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub message_text: String,
    pub message_html: String,
}

impl From<ValidContact> for SanitizedContact {
    fn from(contact: ValidContact) -> Self {
        SanitizedContact {
            name: strip_line_breaks(&contact.name),
            first_name: strip_line_breaks(&contact.first_name),
            email: strip_line_breaks(&contact.email),
            phone: strip_line_breaks(&contact.phone),
            message_text: strip_html(&contact.message),
            message_html: sanitize_message_html(&contact.message),
        }
    }
}

impl SanitizedContact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.name)
    }
}

/// Request metadata attached to the operator notification.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    pub reference: Uuid,
    pub client_ip: String,
    pub received_at: DateTime<Utc>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ContactResponse {
    pub fn sent(timestamp: DateTime<Utc>) -> Self {
        ContactResponse {
            success: true,
            message: "Votre message a été envoyé avec succès!".to_string(),
            timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: ValidationResult,
}

impl From<ValidationResult> for ValidationResponse {
    fn from(errors: ValidationResult) -> Self {
        ValidationResponse {
            valid: errors.is_valid(),
            errors,
        }
    }
}
