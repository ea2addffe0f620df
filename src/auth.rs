//! Bearer-token authentication.
//!
//! Sessions are issued by the user service, which writes `session:{token}` ->
//! user id into its redis. This crate only reads them, from a store kept
//! apart from the link store.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::response::ApiError;
use crate::catalog::UserId;
use crate::link_store::StoreKey;
use crate::AppState;

/// The caller of an authenticated route, inserted as a request extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::unauthorized("Authentication token is missing"))?;

    let session = state
        .sessions
        .get(&StoreKey::Session(token.to_string()).to_string())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let user_id = session.trim().parse::<UserId>().map_err(|_| {
        tracing::warn!("Session entry does not hold a user id");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}
