pub mod auth;
pub mod certnum;
pub mod config;
pub mod db;
pub mod error;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod storage;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn app(state: Arc<state::AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/certificates", get(routes::list_certificates))
        .route("/api/certificates/generate", post(routes::generate_certificate))
        .route("/api/certificates/regenerate", post(routes::regenerate_certificate))
        .route("/api/certificates/signed-url", get(routes::signed_url))
        .route("/api/contacts", get(routes::list_contacts).post(routes::create_contact))
        .route(
            "/api/contacts/:id",
            put(routes::update_contact).delete(routes::delete_contact),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
