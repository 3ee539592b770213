use actix_web::web;

use crate::{constants::API_PREFIX, handlers::{home::home, system::health_check}};

mod contact;
mod form_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.service(
        web::scope(API_PREFIX)
            .configure(contact::config_routes)
    );

    cfg.configure(form_error::config_routes);
}
