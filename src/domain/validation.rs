use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::entities::contact::{ContactSubmission, ValidContact, ValidationResult};
use crate::utils::sanitize::strip_html;

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 100;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const PHONE_MIN_DIGITS: usize = 7;
pub const PHONE_MAX_DIGITS: usize = 15;
pub const MESSAGE_MIN_LENGTH: usize = 10;
pub const MESSAGE_MAX_LENGTH: usize = 2000;

const SUSPICIOUS_WORDS: &[&str] = &[
    "viagra",
    "casino",
    "lottery",
    "bitcoin",
    "crypto",
    "investment",
    "loan",
    "credit",
    "debt",
    "winner",
    "congratulations",
    "prize",
];

static DANGEROUS_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*/?\s*script|javascript\s*:|vbscript\s*:|data\s*:|\bon[a-z]+\s*=")
        .expect("dangerous markup pattern is valid")
});

static NAME_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-ZÀ-ÿ\s'\-]+$").expect("name charset pattern is valid")
});

/// Which rules apply. The interactive scope covers what a visitor can fix
/// while typing; the full scope adds the bot heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationScope {
    Interactive,
    Full,
}

/// The single rule set behind both the submit action and the live
/// validation endpoint.
#[derive(Debug, Clone)]
pub struct ContactSchema {
    min_submission_delay: Duration,
}

impl ContactSchema {
    pub fn new(min_submission_delay: Duration) -> Self {
        Self { min_submission_delay }
    }

    pub fn min_submission_delay(&self) -> Duration {
        self.min_submission_delay
    }

    /// Returns every failing field, first message per field.
    pub fn check(
        &self,
        submission: &ContactSubmission,
        scope: ValidationScope,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let mut result = match submission.validate() {
            Ok(()) => ValidationResult::new(),
            Err(errors) => ValidationResult::from(errors),
        };

        if scope == ValidationScope::Full {
            if submission.has_honeypot() {
                result.add("website", "Champ honeypot détecté - bot suspecté");
            }
            if let Err(message) = self.check_timing(submission.timestamp.as_deref(), now) {
                result.add("timestamp", message);
            }
        }

        result
    }

    /// Validates and normalizes, or hands back the field-error map.
    pub fn validate(
        &self,
        submission: &ContactSubmission,
        scope: ValidationScope,
        now: DateTime<Utc>,
    ) -> Result<ValidContact, ValidationResult> {
        let result = self.check(submission, scope, now);
        if !result.is_valid() {
            return Err(result);
        }

        Ok(ValidContact {
            name: submission.name.trim().to_string(),
            first_name: submission.first_name.trim().to_string(),
            email: submission.email.trim().to_lowercase(),
            phone: normalize_phone(&submission.tel),
            message: submission.message.trim().to_string(),
        })
    }

    fn check_timing(&self, raw: Option<&str>, now: DateTime<Utc>) -> Result<(), &'static str> {
        let started_ms = raw
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or("Horodatage manquant")?
            .parse::<i64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or("Horodatage invalide")?;

        let elapsed_ms = now
            .timestamp_millis()
            .checked_sub(started_ms)
            .ok_or("Horodatage invalide")?;
        if elapsed_ms < self.min_submission_delay.as_millis() as i64 {
            return Err("Soumission trop rapide - bot suspecté");
        }
        Ok(())
    }
}

/// Keeps digits, plus a `+` when it is the first character left once
/// everything else is dropped.
pub fn normalize_phone(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for c in raw.chars().filter(|c| c.is_ascii_digit() || *c == '+') {
        if c != '+' || normalized.is_empty() {
            normalized.push(c);
        }
    }
    normalized
}

pub fn is_valid_phone(raw: &str) -> bool {
    let digits = normalize_phone(raw).trim_start_matches('+').len();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn check_person_name(value: &str, labels: [&'static str; 3]) -> Result<(), ValidationError> {
    let [too_short, too_long, forbidden] = labels;
    let length = value.trim().chars().count();

    if length < NAME_MIN_LENGTH {
        return Err(rule_error("name_length", too_short));
    }
    if length > NAME_MAX_LENGTH {
        return Err(rule_error("name_length", too_long));
    }
    if DANGEROUS_MARKUP.is_match(value) {
        return Err(rule_error("name_dangerous", "Contenu non autorisé détecté"));
    }
    if !NAME_CHARSET.is_match(value.trim()) {
        return Err(rule_error("name_charset", forbidden));
    }
    Ok(())
}

pub fn validate_last_name(value: &str) -> Result<(), ValidationError> {
    check_person_name(
        value,
        [
            "Le nom doit contenir au moins 2 caractères",
            "Le nom ne peut pas dépasser 100 caractères",
            "Le nom contient des caractères non autorisés",
        ],
    )
}

pub fn validate_first_name(value: &str) -> Result<(), ValidationError> {
    check_person_name(
        value,
        [
            "Le prénom doit contenir au moins 2 caractères",
            "Le prénom ne peut pas dépasser 100 caractères",
            "Le prénom contient des caractères non autorisés",
        ],
    )
}

pub fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("email_required", "L'email est requis"));
    }
    // Header injection guard
    if value.contains('\r') || value.contains('\n') {
        return Err(rule_error("email_crlf", "Caractères interdits dans l'email"));
    }
    let email = value.trim();
    if email.len() > EMAIL_MAX_LENGTH {
        return Err(rule_error("email_length", "Email trop long"));
    }
    if !email.validate_email() {
        return Err(rule_error("email_format", "Adresse email invalide"));
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("phone_required", "Le téléphone est requis"));
    }
    if !is_valid_phone(value) {
        return Err(rule_error(
            "phone_format",
            "Format de numéro de téléphone international invalide",
        ));
    }
    Ok(())
}

pub fn validate_message(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();

    if length < MESSAGE_MIN_LENGTH {
        return Err(rule_error(
            "message_length",
            "Le message doit contenir au moins 10 caractères",
        ));
    }
    if length > MESSAGE_MAX_LENGTH {
        return Err(rule_error(
            "message_length",
            "Le message ne peut pas dépasser 2000 caractères",
        ));
    }

    let lowered = trimmed.to_lowercase();
    if SUSPICIOUS_WORDS.iter().any(|word| lowered.contains(word)) {
        return Err(rule_error("message_spam", "Contenu suspect détecté"));
    }

    if strip_html(trimmed).trim().chars().count() < MESSAGE_MIN_LENGTH {
        return Err(rule_error(
            "message_length",
            "Le message est trop court après nettoyage",
        ));
    }
    Ok(())
}

pub fn require_consent(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        return Err(rule_error(
            "consent_required",
            "Vous devez accepter la politique de confidentialité",
        ));
    }
    Ok(())
}
