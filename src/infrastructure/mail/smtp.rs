use std::error::Error as StdError;

use async_trait::async_trait;
use lettre::{
    message::{
        header::{self, Header, HeaderName, HeaderValue},
        Mailbox as LettreMailbox, MultiPart,
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters, TlsVersion},
        Error as SmtpError,
    },
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    entities::email::{EmailMessage, Mailbox},
    errors::MailError,
    mail::transport::Mailer,
    settings::AppConfig,
};

const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP submission to the managed provider, TLS 1.2 minimum.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let tls = TlsParameters::builder(config.smtp_host.clone())
            .set_min_tls_version(TlsVersion::Tlsv12)
            .build_rustls()?;

        // Port 465 speaks TLS from the first byte, anything else upgrades via STARTTLS
        let tls = if config.smtp_port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls)
        } else {
            Tls::Required(tls)
        };

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
            .port(config.smtp_port)
            .tls(tls)
            .credentials(credentials)
            .timeout(Some(config.smtp_timeout()))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let message = build_message(message)?;

        let response = self.transport
            .send(message)
            .await
            .map_err(|e| classify_smtp_error(&e))?;

        if response.is_positive() {
            Ok(())
        } else {
            Err(MailError::Other(format!("SMTP server answered {}", response.code())))
        }
    }

    async fn ping(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Connection("SMTP server did not answer NOOP".into())),
            Err(e) => Err(classify_smtp_error(&e)),
        }
    }
}

/// Maps lettre failures onto the three classes the handler logs.
pub fn classify_smtp_error(err: &SmtpError) -> MailError {
    if let Some(code) = err.status() {
        if is_auth_failure_code(&code.to_string()) {
            return MailError::Authentication;
        }
    }

    let is_reply = err.is_transient() || err.is_permanent() || err.is_response() || err.is_client();
    if err.is_timeout() || err.is_tls() || !is_reply {
        return MailError::Connection(err.to_string());
    }

    MailError::Other(err.to_string())
}

/// 530 auth required, 534 mechanism too weak, 535 bad credentials,
/// 538 encryption required for the mechanism.
pub fn is_auth_failure_code(code: &str) -> bool {
    matches!(code, "530" | "534" | "535" | "538")
}

pub fn build_message(message: &EmailMessage) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(to_lettre_mailbox(&message.from)?)
        .to(to_lettre_mailbox(&message.to)?)
        .subject(message.subject.clone())
        .header(XMailer::default());

    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(to_lettre_mailbox(reply_to)?);
    }

    let built = match &message.html_body {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(
            message.text_body.clone(),
            html.clone(),
        )),
        None => builder
            .header(header::ContentType::TEXT_PLAIN)
            .body(message.text_body.clone()),
    };

    built.map_err(|e| MailError::Other(format!("Failed to build message: {}", e)))
}

fn to_lettre_mailbox(mailbox: &Mailbox) -> Result<LettreMailbox, MailError> {
    let address = mailbox.address
        .parse::<Address>()
        .map_err(|e| MailError::Other(format!("Invalid address: {}", e)))?;
    Ok(LettreMailbox::new(mailbox.name.clone(), address))
}

#[derive(Debug, Clone)]
struct XMailer(String);

impl Default for XMailer {
    fn default() -> Self {
        XMailer(format!("spa-contact/{}", env!("CARGO_PKG_VERSION")))
    }
}

impl Header for XMailer {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Mailer")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Ok(XMailer(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}
