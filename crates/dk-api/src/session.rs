//! Session-scoped actor identity.
//!
//! The label lives in a cookie (base64url so any UTF-8 name survives the
//! header) and API clients may override it per request with a header.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dk_core::Actor;

pub const ACTOR_COOKIE: &str = "docket_actor";
pub const ACTOR_HEADER: &str = "X-Docket-Actor";

/// Header first, then cookie, then the configured fallback identity.
pub fn current_actor(req: &HttpRequest, fallback: &str) -> Actor {
    let header = req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let cookie = req.cookie(ACTOR_COOKIE).and_then(|c| decode(c.value()));
    Actor::resolve(header.or(cookie).as_deref(), fallback)
}

pub fn actor_cookie(label: &str) -> Cookie<'static> {
    Cookie::build(ACTOR_COOKIE, URL_SAFE_NO_PAD.encode(label.trim()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .finish()
}

fn decode(value: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    String::from_utf8(bytes).ok()
}

/// Only same-site absolute paths are valid redirect targets.
pub fn safe_return_path(back: &str) -> &str {
    if back.starts_with('/') && !back.starts_with("//") {
        back
    } else {
        "/"
    }
}
