use serde::Serialize;

/// A fully rendered message, built once per recipient and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: Mailbox,
    pub to: Mailbox,
    pub reply_to: Option<Mailbox>,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn new(name: Option<String>, address: impl Into<String>) -> Self {
        Self { name, address: address.into() }
    }

    pub fn address_only(address: impl Into<String>) -> Self {
        Self::new(None, address)
    }
}

/// Which side of the conversation a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    OperatorNotification,
    SubmitterConfirmation,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::OperatorNotification => "operator_notification",
            EmailKind::SubmitterConfirmation => "submitter_confirmation",
        }
    }
}
