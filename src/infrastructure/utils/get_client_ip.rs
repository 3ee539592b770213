use actix_web::{http::header::HeaderMap, HttpRequest};

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Proxy headers consulted in order. `X-Forwarded-For` contributes its first hop.
const PROXY_HEADERS: [&str; 4] = ["x-forwarded-for", "x-real-ip", "x-client-ip", "cf-connecting-ip"];

/// Extract the client's IP address from the request.
/// `trust_proxy_headers`: whether to believe forwarding headers. They are
/// trivially spoofable unless a trusted proxy overwrites them.
pub fn get_client_ip(req: &HttpRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        return ip_from_proxy_headers(req.headers())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub fn ip_from_proxy_headers(headers: &HeaderMap) -> Option<String> {
    PROXY_HEADERS.iter().find_map(|name| {
        let value = headers.get(*name)?.to_str().ok()?;
        let first_hop = value.split(',').next().unwrap_or("").trim();
        (!first_hop.is_empty()).then(|| first_hop.to_string())
    })
}
