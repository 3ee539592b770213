use async_trait::async_trait;

use crate::{entities::email::EmailMessage, errors::MailError};

/// Outbound mail seam. Production uses SMTP; tests swap in recorders.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;

    async fn ping(&self) -> Result<(), MailError>;
}
