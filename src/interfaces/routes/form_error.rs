use actix_web::{
    web,
    http::StatusCode,
    ResponseError,
    HttpResponse,
    error::UrlencodedError,
};
use serde_json::json;

use crate::constants::FORM_PAYLOAD_LIMIT;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(FORM_PAYLOAD_LIMIT)
            .error_handler(|err, _req| FormError::from(err).into()),
    );
}

/// Body that could not be decoded as a form, reported in the same shape as
/// the other submission errors.
#[derive(Debug)]
pub struct FormError {
    message: String,
    status: StatusCode
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for FormError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status).json(json!({
            "success": false,
            "code": "BAD_REQUEST",
            "message": self.message
        }))
    }
}

impl From<UrlencodedError> for FormError {
    fn from(err: UrlencodedError) -> Self {
        let status = match err {
            UrlencodedError::Overflow { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UrlencodedError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        FormError {
            message: format!("Form payload error: {}", err),
            status,
        }
    }
}
