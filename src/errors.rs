use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse
};
use chrono::{DateTime, Utc};
use derive_more::Display;

use crate::entities::contact::ValidationResult;

/// Generic message returned for every failure the visitor cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Une erreur est survenue lors de l'envoi du message. Veuillez réessayer plus tard.";

#[derive(Debug)]
pub enum AppError {
    ValidationError(ValidationResult),
    RateLimited { retry_after_secs: u64, reset_at: DateTime<Utc> },
    Unauthorized,
    ServiceUnavailable,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(result) => {
                let messages = result.iter()
                    .map(|(field, message)| format!("{}:{}", field, message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::RateLimited { retry_after_secs, .. } => {
                write!(f, "Rate limited, retry after {}s", retry_after_secs)
            }
            AppError::Unauthorized => write!(f, "Unauthorized origin"),
            AppError::ServiceUnavailable => write!(f, "Mail service unavailable"),
        }
    }
}

impl AppError {
    /// Machine readable classification exposed to the browser.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "BAD_REQUEST",
            AppError::RateLimited { .. } => "TOO_MANY_REQUESTS",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::ServiceUnavailable => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(result) => {
                serde_json::json!({
                    "success": false,
                    "code": self.code(),
                    "message": "Certains champs sont invalides",
                    "fields": result
                })
            }
            AppError::RateLimited { retry_after_secs, reset_at } => {
                serde_json::json!({
                    "success": false,
                    "code": self.code(),
                    "message": "Trop de tentatives. Veuillez attendre avant de réessayer.",
                    "retry_after": retry_after_secs,
                    "resetAt": reset_at.to_rfc3339()
                })
            }
            AppError::Unauthorized => {
                serde_json::json!({
                    "success": false,
                    "code": self.code(),
                    "message": "Origine de la requête non autorisée"
                })
            }
            // Details stay in the logs
            AppError::ServiceUnavailable => {
                serde_json::json!({
                    "success": false,
                    "code": self.code(),
                    "message": GENERIC_FAILURE_MESSAGE
                })
            }
        };

        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());
        if let AppError::RateLimited { retry_after_secs, .. } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }
        builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationResult> for AppError {
    fn from(result: ValidationResult) -> Self {
        AppError::ValidationError(result)
    }
}

impl From<MailError> for AppError {
    fn from(_: MailError) -> Self {
        AppError::ServiceUnavailable
    }
}

/// Failure classes of the outbound mail transport. Only ever logged.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum MailError {
    #[display("SMTP authentication failed")]
    Authentication,

    #[display("SMTP connection failed: {_0}")]
    Connection(String),

    #[display("Mail delivery failed: {_0}")]
    Other(String),
}

impl MailError {
    pub fn kind(&self) -> &'static str {
        match self {
            MailError::Authentication => "auth",
            MailError::Connection(_) => "connection",
            MailError::Other(_) => "other",
        }
    }
}

impl std::error::Error for MailError {}
