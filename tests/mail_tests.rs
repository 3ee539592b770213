mod test_utils;

use std::{sync::Arc, time::Duration};

use ammonia::clean_text;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::{mock, Sequence};
use spa_contact::{
    entities::{
        contact::{SanitizedContact, SubmissionContext},
        email::{EmailMessage, Mailbox},
    },
    errors::{AppError, MailError},
    limiter::rate_limiter::SlidingWindowLimiter,
    mail::{
        composer::MessageComposer,
        smtp::{build_message, is_auth_failure_code},
        transport::Mailer,
    },
    use_cases::contact::{ContactHandler, SubmissionOutcome},
    validation::ContactSchema,
};
use test_utils::valid_submission;
use uuid::Uuid;

mock! {
    pub SmtpMailer {}

    #[async_trait]
    impl Mailer for SmtpMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
        async fn ping(&self) -> Result<(), MailError>;
    }
}

fn composer() -> MessageComposer {
    MessageComposer::new(
        Mailbox::new(Some("Formulaire de contact".into()), "spa@example.com"),
        Mailbox::address_only("contact@example.com"),
        "Spa Test",
    )
}

fn handler(mailer: MockSmtpMailer) -> ContactHandler {
    ContactHandler::new(
        Arc::new(mailer),
        SlidingWindowLimiter::new(3, Duration::from_secs(900)),
        ContactSchema::new(Duration::from_secs(3)),
        composer(),
    )
}

fn sanitized_contact() -> SanitizedContact {
    SanitizedContact {
        name: "Dupont".into(),
        first_name: "Jean".into(),
        email: "jean@example.com".into(),
        phone: "+32470123456".into(),
        message_text: "Bonjour, je souhaite réserver.\nMerci".into(),
        message_html: "Bonjour, je souhaite réserver.<br>\nMerci".into(),
    }
}

#[test]
fn operator_notification_carries_fields_and_metadata() {
    let context = SubmissionContext {
        reference: Uuid::nil(),
        client_ip: "203.0.113.5".into(),
        received_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
    };

    let email = composer().operator_notification(&sanitized_contact(), &context);

    assert_eq!(email.from.address, "spa@example.com");
    assert_eq!(email.to, Mailbox::address_only("contact@example.com"));
    assert_eq!(
        email.reply_to,
        Some(Mailbox::new(Some("Jean Dupont".into()), "jean@example.com"))
    );
    assert_eq!(email.subject, "Nouveau message de contact - Jean Dupont");
    assert!(email.text_body.contains("Nom: Dupont"));
    assert!(email.text_body.contains("Prénom: Jean"));
    assert!(email.text_body.contains("Téléphone: +32470123456"));
    assert!(email.text_body.contains("14/03/2026 09:30:00 UTC"));
    assert!(email.text_body.contains("IP: 203.0.113.5"));

    let html = email.html_body.unwrap();
    assert!(html.contains("réserver.<br>\nMerci"));
    assert!(html.contains("203.0.113.5"));
}

#[test]
fn confirmation_goes_back_to_the_visitor() {
    let email = composer().submitter_confirmation(&sanitized_contact());

    assert_eq!(email.to.address, "jean@example.com");
    assert_eq!(email.reply_to, Some(Mailbox::address_only("contact@example.com")));
    assert_eq!(email.subject, "Nous avons bien reçu votre message - Spa Test");
    assert!(email.text_body.starts_with("Bonjour Jean,"));
    assert!(email.html_body.unwrap().contains("Spa&#32;Test"));
}

#[test]
fn html_bodies_escape_interpolated_values() {
    let mut contact = sanitized_contact();
    contact.first_name = "<Jean>".into();
    contact.name = "O'Neil \"Dupont\"".into();

    let context = SubmissionContext {
        reference: Uuid::nil(),
        client_ip: "203.0.113.5".into(),
        received_at: Utc::now(),
    };
    let notification = composer().operator_notification(&contact, &context);
    let confirmation = composer().submitter_confirmation(&contact);

    let html = confirmation.html_body.unwrap();
    assert!(html.contains("&lt;Jean&gt;"));
    assert!(!html.contains("<Jean>"));

    let html = notification.html_body.unwrap();
    assert!(html.contains(&clean_text("O'Neil \"Dupont\"")));
    assert!(!html.contains("\"Dupont\""));
    // Plain text keeps the values as typed
    assert!(notification.text_body.contains("Nom: O'Neil \"Dupont\""));
}

#[test]
fn built_message_is_multipart_with_reply_to() {
    let email = composer().submitter_confirmation(&sanitized_contact());

    let message = build_message(&email).expect("message builds");
    let raw = String::from_utf8(message.formatted()).unwrap();

    assert!(raw.contains("Reply-To: contact@example.com"));
    assert!(raw.contains("multipart/alternative"));
    assert!(raw.contains("X-Mailer: spa-contact/"));
    assert!(raw.contains("jean@example.com>"));
}

#[test]
fn text_only_message_builds_without_multipart() {
    let email = EmailMessage {
        from: Mailbox::address_only("spa@example.com"),
        to: Mailbox::address_only("contact@example.com"),
        reply_to: None,
        subject: "Test".into(),
        text_body: "Hello".into(),
        html_body: None,
    };

    let raw = String::from_utf8(build_message(&email).unwrap().formatted()).unwrap();

    assert!(raw.contains("Content-Type: text/plain"));
    assert!(!raw.contains("multipart"));
}

#[test]
fn invalid_address_is_a_non_transport_failure() {
    let mut email = composer().submitter_confirmation(&sanitized_contact());
    email.to = Mailbox::address_only("not an address");

    let err = build_message(&email).unwrap_err();

    assert_eq!(err.kind(), "other");
}

#[test]
fn auth_reply_codes_are_recognised() {
    for code in ["530", "534", "535", "538"] {
        assert!(is_auth_failure_code(code));
    }
    for code in ["421", "450", "550", "554"] {
        assert!(!is_auth_failure_code(code));
    }
}

#[actix_rt::test]
async fn notification_is_sent_before_confirmation() {
    let mut mailer = MockSmtpMailer::new();
    let mut seq = Sequence::new();
    mailer.expect_send()
        .withf(|m: &EmailMessage| m.to.address == "contact@example.com")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    mailer.expect_send()
        .withf(|m: &EmailMessage| m.to.address == "jean@example.com")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let outcome = handler(mailer)
        .submit(valid_submission(), "203.0.113.20")
        .await
        .unwrap();

    assert!(matches!(outcome, SubmissionOutcome::Sent { .. }));
}

#[actix_rt::test]
async fn failed_notification_skips_confirmation() {
    let mut mailer = MockSmtpMailer::new();
    mailer.expect_send()
        .times(1)
        .returning(|_| Err(MailError::Connection("connection refused".into())));

    let err = handler(mailer)
        .submit(valid_submission(), "203.0.113.21")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ServiceUnavailable));
    assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
}

#[actix_rt::test]
async fn honeypot_never_reaches_the_transport() {
    let mut mailer = MockSmtpMailer::new();
    mailer.expect_send().never();

    let mut submission = valid_submission();
    submission.honeypot = Some("filled".into());

    let outcome = handler(mailer)
        .submit(submission, "203.0.113.22")
        .await
        .unwrap();

    assert_eq!(outcome, SubmissionOutcome::Discarded);
}

#[actix_rt::test]
async fn rate_limit_is_checked_before_anything_else() {
    let mut mailer = MockSmtpMailer::new();
    mailer.expect_send().never();
    let handler = handler(mailer);

    let mut bot = valid_submission();
    bot.honeypot = Some("filled".into());
    for _ in 0..3 {
        handler.submit(bot.clone(), "203.0.113.23").await.unwrap();
    }

    let err = handler.submit(bot, "203.0.113.23").await.unwrap_err();

    match err {
        AppError::RateLimited { retry_after_secs, reset_at } => {
            assert!(retry_after_secs > 0);
            assert!(reset_at > Utc::now());
        }
        other => panic!("expected rate limit, got {:?}", other),
    }
}
