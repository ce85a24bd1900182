use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::DocumentStore;

use super::handlers;
use super::rate_limit::{RateLimiter, rate_limit};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(store: Arc<DocumentStore>, limiter: Arc<RateLimiter>) -> Self {
        Self { store, limiter }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthcheck))
        .route(
            "/api/{resource}/v1",
            get(handlers::fetch)
                .post(handlers::create)
                .put(handlers::update)
                .delete(handlers::remove),
        )
        .route("/api/{resource}/v1/summary", get(handlers::summary))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
