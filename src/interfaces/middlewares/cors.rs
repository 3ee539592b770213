use actix_cors::Cors;
use actix_web::http::{header, Method};

use crate::settings::AppConfig;

/// CORS policy for the static site posting to this API.
pub fn build_cors(config: &AppConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods([Method::GET, Method::POST])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
        // Foreign origins reach the handler, which answers UNAUTHORIZED itself
        .block_on_origin_mismatch(false);

    if config.allows_any_origin() {
        return cors.allow_any_origin();
    }

    config
        .cors_origins()
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
