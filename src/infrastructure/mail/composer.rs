use ammonia::clean_text;

use crate::{
    entities::{
        contact::{SanitizedContact, SubmissionContext},
        email::{EmailMessage, Mailbox},
    },
    settings::AppConfig,
    utils::sanitize::strip_line_breaks,
};

/// Renders the two messages sent for every accepted submission.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    sender: Mailbox,
    operator: Mailbox,
    venue_name: String,
}

impl MessageComposer {
    pub fn new(sender: Mailbox, operator: Mailbox, venue_name: impl Into<String>) -> Self {
        Self {
            sender,
            operator,
            venue_name: strip_line_breaks(&venue_name.into()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Mailbox::new(Some(config.mail_from_name.clone()), config.smtp_username.clone()),
            Mailbox::address_only(config.contact_recipient.clone()),
            config.venue_name.clone(),
        )
    }

    /// Everything the visitor sent plus request metadata. Replies go to the visitor.
    pub fn operator_notification(
        &self,
        contact: &SanitizedContact,
        context: &SubmissionContext,
    ) -> EmailMessage {
        let received_at = context.received_at.format("%d/%m/%Y %H:%M:%S UTC").to_string();

        let text_body = format!(
            "Nouveau message du formulaire de contact\n\
             \n\
             Nom: {name}\n\
             Prénom: {first_name}\n\
             Email: {email}\n\
             Téléphone: {phone}\n\
             Message:\n\
             {message}\n\
             \n\
             ---\n\
             Email reçu le: {received_at}\n\
             IP: {ip}\n\
             Référence: {reference}\n",
            name = contact.name,
            first_name = contact.first_name,
            email = contact.email,
            phone = contact.phone,
            message = contact.message_text,
            received_at = received_at,
            ip = context.client_ip,
            reference = context.reference,
        );

        let html_body = format!(
            "<h2>Nouveau message du formulaire de contact</h2>\n\
             <table>\n\
             <tr><td><strong>Nom</strong></td><td>{name}</td></tr>\n\
             <tr><td><strong>Prénom</strong></td><td>{first_name}</td></tr>\n\
             <tr><td><strong>Email</strong></td><td>{email}</td></tr>\n\
             <tr><td><strong>Téléphone</strong></td><td>{phone}</td></tr>\n\
             </table>\n\
             <p><strong>Message :</strong></p>\n\
             <p>{message}</p>\n\
             <hr>\n\
             <p><small>Email reçu le {received_at} depuis {ip} (référence {reference})</small></p>\n",
            name = clean_text(&contact.name),
            first_name = clean_text(&contact.first_name),
            email = clean_text(&contact.email),
            phone = clean_text(&contact.phone),
            message = contact.message_html,
            received_at = received_at,
            ip = clean_text(&context.client_ip),
            reference = context.reference,
        );

        EmailMessage {
            from: self.sender.clone(),
            to: self.operator.clone(),
            reply_to: Some(Mailbox::new(Some(contact.full_name()), contact.email.clone())),
            subject: format!("Nouveau message de contact - {}", contact.full_name()),
            text_body,
            html_body: Some(html_body),
        }
    }

    /// Acknowledges receipt to the visitor. Replies go to the operator.
    pub fn submitter_confirmation(&self, contact: &SanitizedContact) -> EmailMessage {
        let text_body = format!(
            "Bonjour {first_name},\n\
             \n\
             Nous avons bien reçu votre message et vous répondrons dans les plus brefs délais.\n\
             \n\
             Votre message :\n\
             {message}\n\
             \n\
             À très bientôt,\n\
             {venue}\n",
            first_name = contact.first_name,
            message = contact.message_text,
            venue = self.venue_name,
        );

        let html_body = format!(
            "<p>Bonjour {first_name},</p>\n\
             <p>Nous avons bien reçu votre message et vous répondrons dans les plus brefs délais.</p>\n\
             <p><strong>Votre message :</strong></p>\n\
             <blockquote>{message}</blockquote>\n\
             <p>À très bientôt,<br>\n{venue}</p>\n",
            first_name = clean_text(&contact.first_name),
            message = contact.message_html,
            venue = clean_text(&self.venue_name),
        );

        EmailMessage {
            from: self.sender.clone(),
            to: Mailbox::new(Some(contact.full_name()), contact.email.clone()),
            reply_to: Some(self.operator.clone()),
            subject: format!("Nous avons bien reçu votre message - {}", self.venue_name),
            text_body,
            html_body: Some(html_body),
        }
    }
}
