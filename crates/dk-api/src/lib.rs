//! # dk-api
//!
//! The web routing and orchestration layer for Docket.

pub mod api;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;

use actix_web::web;

pub use handlers::AppState;

/// Configures the routes for the directory, the forum and the JSON API.
///
/// # Developer Note
/// Kept as a `ServiceConfig` function so the binary and the tests mount the
/// exact same routes. Routes are registered flat (no catch-all scope) so
/// services mounted after them, like static files, stay reachable.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(api::health))
            .route("/items", web::get().to(api::list_items))
            .route("/items", web::post().to(api::create_item))
            .route("/items/{id}/links", web::post().to(api::add_link))
            .route("/items/{id}/upvote", web::post().to(api::upvote))
            .route("/threads", web::get().to(api::list_threads))
            .route("/threads", web::post().to(api::create_thread))
            .route("/threads/{id}/posts", web::post().to(api::reply)),
    )
    // The Directory (search + quick actions)
    .route("/", web::get().to(handlers::directory))
    .route("/items/new", web::get().to(handlers::new_item_form))
    .route("/items", web::post().to(handlers::create_item))
    .route("/items/{id}/links", web::post().to(handlers::add_link))
    .route("/items/{id}/upvote", web::post().to(handlers::upvote))
    // The Forum
    .route("/forum", web::get().to(handlers::forum))
    .route("/threads", web::post().to(handlers::create_thread))
    .route("/threads/{id}/posts", web::post().to(handlers::reply))
    // Session identity
    .route("/identity", web::post().to(handlers::set_identity));
}
