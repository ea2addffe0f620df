use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;

use super::media::{media_response, MediaResponse};
use crate::api::response::ApiError;
use crate::auth::AuthUser;
use crate::catalog::MediaRecord;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub video: Vec<MediaResponse>,
    pub audio: Vec<MediaResponse>,
}

/// GET /recommendations
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let recommendations = state
        .recommender
        .recommend(&state.db, user.user_id, Utc::now())?;

    let render = |items: Vec<MediaRecord>| {
        items
            .into_iter()
            .map(|m| media_response(&state.db, m))
            .collect::<Result<Vec<_>, ApiError>>()
    };

    Ok(Json(RecommendationsResponse {
        video: render(recommendations.video)?,
        audio: render(recommendations.audio)?,
    }))
}
