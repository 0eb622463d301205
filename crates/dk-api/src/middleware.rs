//! docket/crates/dk-api/src/middleware.rs Middleware
//!
//! Request logging, CORS and security headers for the Docket server.

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};

/// Returns the request logger.
pub fn standard_middleware() -> Logger {
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

/// CORS for the JSON API; read and submit only.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec!["content-type", "x-docket-actor"])
        .max_age(3600)
}

/// Headers added to every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add((
            "Content-Security-Policy",
            "default-src 'self'; style-src 'self'; img-src 'self' data:; form-action 'self'",
        ))
}
