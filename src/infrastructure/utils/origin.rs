use actix_web::{http::header, HttpRequest};

/// True when the request carries no `Origin`, or one present in the allow-list.
/// A `*` entry admits every origin.
pub fn is_origin_allowed(req: &HttpRequest, allowed_origins: &[String]) -> bool {
    let Some(origin) = req.headers().get(header::ORIGIN) else {
        return true;
    };
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let origin = origin.trim_end_matches('/');

    allowed_origins
        .iter()
        .any(|allowed| allowed == "*" || allowed.trim_end_matches('/').eq_ignore_ascii_case(origin))
}
