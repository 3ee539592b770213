use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use validator::ValidateEmail;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    #[serde(default = "default_smtp_timeout")]
    pub smtp_timeout_secs: u64,

    #[serde(default = "default_mail_from_name")]
    pub mail_from_name: String,

    /// Operator inbox; falls back to the SMTP account when unset.
    #[serde(default)]
    pub contact_recipient: String,

    #[serde(default = "default_venue_name")]
    pub venue_name: String,

    #[serde(default = "default_rate_limit_max_attempts")]
    pub rate_limit_max_attempts: usize,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_rate_limit_sweep_interval")]
    pub rate_limit_sweep_interval_secs: u64,

    #[serde(default = "default_min_submission_delay")]
    pub min_submission_delay_secs: u64,

    #[serde(default = "default_true")]
    pub trust_proxy_headers: bool,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Spa-Contact-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_smtp_port() -> u16 {
    465
}
fn default_smtp_timeout() -> u64 {
    10
}
fn default_mail_from_name() -> String {
    "Formulaire de contact".to_string()
}
fn default_venue_name() -> String {
    "Le Spa".to_string()
}
fn default_rate_limit_max_attempts() -> usize {
    3
}
fn default_rate_limit_window() -> u64 {
    15 * 60
}
fn default_rate_limit_sweep_interval() -> u64 {
    15 * 60
}
fn default_min_submission_delay() -> u64 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_timeout_secs: default_smtp_timeout(),
            mail_from_name: default_mail_from_name(),
            contact_recipient: String::new(),
            venue_name: default_venue_name(),
            rate_limit_max_attempts: default_rate_limit_max_attempts(),
            rate_limit_window_secs: default_rate_limit_window(),
            rate_limit_sweep_interval_secs: default_rate_limit_sweep_interval(),
            min_submission_delay_secs: default_min_submission_delay(),
            trust_proxy_headers: default_true(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Credentials usually come from the host environment, not from files
        config.smtp_username = fill_or_env(config.smtp_username, "APP_SMTP_USERNAME")?;
        config.smtp_password = fill_or_env(config.smtp_password, "APP_SMTP_PASSWORD")?;

        if config.contact_recipient.trim().is_empty() {
            config.contact_recipient = config.smtp_username.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.smtp_host.trim().is_empty() {
            errors.push("SMTP_HOST cannot be empty");
        }
        if self.smtp_username.trim().is_empty() {
            errors.push("SMTP_USERNAME cannot be empty");
        }
        if self.smtp_password.is_empty() {
            errors.push("SMTP_PASSWORD cannot be empty");
        }
        if !self.smtp_username.validate_email() {
            errors.push("SMTP_USERNAME must be an email address");
        }
        if !self.contact_recipient.validate_email() {
            errors.push("CONTACT_RECIPIENT must be an email address");
        }
        if self.rate_limit_max_attempts == 0 {
            errors.push("RATE_LIMIT_MAX_ATTEMPTS must be greater than zero");
        }
        if self.rate_limit_window_secs == 0 {
            errors.push("RATE_LIMIT_WINDOW_SECS must be greater than zero");
        }
        if self.rate_limit_sweep_interval_secs == 0 {
            errors.push("RATE_LIMIT_SWEEP_INTERVAL_SECS must be greater than zero");
        }
        if self.is_production() && self.allows_any_origin() {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins().iter().any(|o| o == "*")
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_interval_secs)
    }

    pub fn min_submission_delay(&self) -> Duration {
        Duration::from_secs(self.min_submission_delay_secs)
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.redact())
            .field("smtp_timeout_secs", &self.smtp_timeout_secs)
            .field("mail_from_name", &self.mail_from_name)
            .field("contact_recipient", &self.contact_recipient)
            .field("venue_name", &self.venue_name)
            .field("rate_limit_max_attempts", &self.rate_limit_max_attempts)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("rate_limit_sweep_interval_secs", &self.rate_limit_sweep_interval_secs)
            .field("min_submission_delay_secs", &self.min_submission_delay_secs)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish()
    }
}
