use actix_web::{get, web, HttpResponse, Responder};

use crate::AppState;

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Contact API for {}", state.config.venue_name),
        "status": "Ok",
        "name": state.config.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "submit": "POST /api/v1/contact",
            "validate": "POST /api/v1/contact/validate",
            "health": "GET /health"
        }
    }))
}
