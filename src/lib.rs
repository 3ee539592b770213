use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod telemetry;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, middlewares, routes};
pub use infrastructure::{limiter, mail, utils};

use limiter::rate_limiter::SlidingWindowLimiter;
use mail::{composer::MessageComposer, transport::Mailer};
use use_cases::contact::ContactHandler;
use validation::ContactSchema;

pub struct AppState {
    pub contact_handler: ContactHandler,
    pub config: settings::AppConfig,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let rate_limiter = SlidingWindowLimiter::new(
            config.rate_limit_max_attempts,
            config.rate_limit_window(),
        );
        let schema = ContactSchema::new(config.min_submission_delay());
        let composer = MessageComposer::from_config(config);

        AppState {
            contact_handler: ContactHandler::new(mailer, rate_limiter, schema, composer),
            config: config.clone(),
        }
    }
}
