//! Route table: public, authenticated, and admin-only groups.

use axum::http::Method;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{admin, ai, auth, consultation, health, user};
use crate::middleware::{log_requests, require_admin, require_auth};
use crate::state::AppState;

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    let admin_routes = Router::new()
        .route("/admin/statistics", get(admin::statistics))
        .route("/admin/consultations", get(admin::consultations))
        .route_layer(from_fn(require_admin));

    let protected = Router::new()
        .route("/user", get(user::current))
        .route("/logout", post(auth::logout))
        .route("/user/profile", get(user::profile).put(user::update_profile))
        .route("/user/dashboard", get(user::dashboard_stats))
        .route("/ai/process", post(ai::process))
        .route("/ai/survey", post(ai::survey))
        .route("/consultation/history", get(consultation::history))
        .route("/consultation/:id", get(consultation::show))
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(from_fn(log_requests))
}
