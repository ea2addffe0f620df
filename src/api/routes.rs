use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::request_id::{propagate_request_id, request_span};
use crate::auth::require_user;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let authenticated = Router::new()
        .route("/media", get(handlers::list_media))
        .route("/media/tags", get(handlers::list_tags))
        .route("/media/:id/link", get(handlers::issue_link))
        .route("/media/:id/rating", post(handlers::rate_media))
        .route("/recommendations", get(handlers::get_recommendations))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_user,
        ));

    Router::new()
        .merge(authenticated)
        // The link itself is the credential
        .route("/stream/:link_id/:filename", get(handlers::stream_media))
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(middleware::from_fn(propagate_request_id))
        .with_state(state)
}
