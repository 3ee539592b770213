use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    domain::validation::{ContactSchema, ValidationScope},
    entities::{
        contact::{ContactSubmission, SanitizedContact, SubmissionContext, ValidationResult},
        email::{EmailKind, EmailMessage},
    },
    errors::AppError,
    limiter::rate_limiter::SlidingWindowLimiter,
    mail::{composer::MessageComposer, transport::Mailer},
};

/// How an accepted request ended. Both variants look identical to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Sent { reference: Uuid },
    /// Honeypot filled: nothing sent, success reported anyway.
    Discarded,
}

pub struct ContactHandler {
    pub mailer: Arc<dyn Mailer>,
    pub rate_limiter: SlidingWindowLimiter,
    pub schema: ContactSchema,
    composer: MessageComposer,
}

impl ContactHandler {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        rate_limiter: SlidingWindowLimiter,
        schema: ContactSchema,
        composer: MessageComposer,
    ) -> Self {
        ContactHandler { mailer, rate_limiter, schema, composer }
    }

    /// Handles one submission from `client_ip`.
    pub async fn submit(
        &self,
        submission: ContactSubmission,
        client_ip: &str,
    ) -> Result<SubmissionOutcome, AppError> {
        self.submit_at(submission, client_ip, Utc::now()).await
    }

    /// Rate limit, bot checks, schema, sanitization, then the two sends in order.
    pub async fn submit_at(
        &self,
        submission: ContactSubmission,
        client_ip: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, AppError> {
        let reference = Uuid::new_v4();
        let span = tracing::info_span!("contact_submission", %reference, client_ip = %client_ip);

        async move {
            let decision = self.rate_limiter.check(client_ip);
            if !decision.allowed {
                tracing::warn!(
                    retry_after_secs = decision.retry_after_secs(),
                    "Contact form rate limit exceeded"
                );
                return Err(AppError::RateLimited {
                    retry_after_secs: decision.retry_after_secs(),
                    reset_at: decision.reset_at,
                });
            }

            if submission.has_honeypot() {
                tracing::warn!("Honeypot field filled, discarding submission");
                return Ok(SubmissionOutcome::Discarded);
            }

            let contact = match self.schema.validate(&submission, ValidationScope::Full, now) {
                Ok(contact) => contact,
                Err(errors) => {
                    let fields: Vec<&String> = errors.iter().map(|(field, _)| field).collect();
                    tracing::info!(?fields, "Submission rejected by schema");
                    return Err(errors.into());
                }
            };

            let contact = SanitizedContact::from(contact);
            let context = SubmissionContext {
                reference,
                client_ip: client_ip.to_string(),
                received_at: now,
            };

            let notification = self.composer.operator_notification(&contact, &context);
            self.dispatch(EmailKind::OperatorNotification, &notification).await?;

            let confirmation = self.composer.submitter_confirmation(&contact);
            self.dispatch(EmailKind::SubmitterConfirmation, &confirmation).await?;

            tracing::info!("Contact email sent");
            Ok(SubmissionOutcome::Sent { reference })
        }
        .instrument(span)
        .await
    }

    /// Interactive rules only, no side effects.
    pub fn validate_interactive(&self, submission: &ContactSubmission) -> ValidationResult {
        self.schema.check(submission, ValidationScope::Interactive, Utc::now())
    }

    async fn dispatch(&self, kind: EmailKind, message: &EmailMessage) -> Result<(), AppError> {
        self.mailer.send(message).await.map_err(|e| {
            tracing::error!(
                email = kind.as_str(),
                error_kind = e.kind(),
                error = %e,
                "Failed to send contact email"
            );
            AppError::from(e)
        })
    }
}
