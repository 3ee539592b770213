use actix_web::{
    middleware::NormalizePath,
    web,
    App, HttpServer
};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use spa_contact::{
    entities::{contact::ContactSubmission, email::EmailMessage},
    errors::MailError,
    mail::transport::Mailer,
    middlewares::cors::build_cors,
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use std::{
    net::TcpListener,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Keeps every message it is asked to send. Can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failure: Arc<Mutex<Option<MailError>>>,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub fn failing_with(error: MailError) -> Self {
        let mailer = Self::default();
        *mailer.failure.lock().unwrap() = Some(error);
        mailer
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), MailError> {
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mailer: RecordingMailer,
    pub config: AppConfig,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), RecordingMailer::default()).await
    }

    pub async fn spawn_with(config: AppConfig, mailer: RecordingMailer) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state = web::Data::new(AppState::new(&config, Arc::new(mailer.clone())));

        let server_config = config.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(build_cors(&server_config))
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            mailer,
            config,
        }
    }

    pub async fn post_contact(&self, submission: &ContactSubmission, client_ip: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/v1/contact", self.address))
            .header("X-Forwarded-For", client_ip)
            .form(submission)
            .send()
            .await
            .expect("Failed to post contact form")
    }

    pub async fn post_validate(&self, submission: &ContactSubmission) -> reqwest::Response {
        self.client
            .post(format!("{}/api/v1/contact/validate", self.address))
            .form(submission)
            .send()
            .await
            .expect("Failed to post validation request")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Spa Contact Test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        worker_count: 1,
        smtp_host: "smtp.example.com".to_string(),
        smtp_username: "spa@example.com".to_string(),
        smtp_password: "test-app-password".to_string(),
        contact_recipient: "contact@example.com".to_string(),
        venue_name: "Spa Test".to_string(),
        ..AppConfig::default()
    }
}

/// Form as a human would send it, rendered ten seconds ago.
#[allow(dead_code)]
pub fn valid_submission() -> ContactSubmission {
    ContactSubmission {
        name: "Dupont".to_string(),
        first_name: "Jean".to_string(),
        email: "jean@example.com".to_string(),
        tel: "+32470123456".to_string(),
        message: "Bonjour, je souhaite réserver.".to_string(),
        honeypot: None,
        timestamp: Some(rendered_ago(10)),
        consent: true,
    }
}

#[allow(dead_code)]
pub fn rendered_ago(secs: i64) -> String {
    (Utc::now() - ChronoDuration::seconds(secs)).timestamp_millis().to_string()
}
