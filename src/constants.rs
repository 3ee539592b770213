use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const API_PREFIX: &str = "/api/v1";

/// Upper bound for a form-encoded body; a maximal message fits several times.
pub const FORM_PAYLOAD_LIMIT: usize = 32 * 1024;

/// Health responses are rebuilt at most this often.
pub const HEALTH_CACHE_SECS: i64 = 5;
