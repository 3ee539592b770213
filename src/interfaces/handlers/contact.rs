use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;

use crate::{
    entities::contact::{ContactResponse, ContactSubmission, ValidationResponse},
    errors::AppError,
    utils::{get_client_ip::get_client_ip, origin::is_origin_allowed},
    AppState,
};

#[post("")]
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<ContactSubmission>,
) -> Result<HttpResponse, AppError> {
    if !is_origin_allowed(&req, &state.config.cors_origins()) {
        tracing::warn!("Contact submission refused for foreign origin");
        return Err(AppError::Unauthorized);
    }

    let client_ip = get_client_ip(&req, state.config.trust_proxy_headers);

    // Discarded bot submissions get the same answer as real ones
    state.contact_handler
        .submit(form.into_inner(), &client_ip)
        .await?;

    Ok(HttpResponse::Ok().json(ContactResponse::sent(Utc::now())))
}

#[post("/validate")]
pub async fn validate_contact(
    state: web::Data<AppState>,
    form: web::Form<ContactSubmission>,
) -> impl Responder {
    let result = state.contact_handler.validate_interactive(&form);
    HttpResponse::Ok().json(ValidationResponse::from(result))
}
