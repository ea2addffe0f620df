use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::api::response::{ApiError, AppJson, AppQuery};
use crate::auth::AuthUser;
use crate::catalog::{Database, MediaId, MediaKind, MediaRecord, RatingKind, RatingOutcome, Tag};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: u64,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

/// Public view of a media record, shared by listings and recommendations.
#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub id: MediaId,
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<MediaKind>,
    pub company_id: u64,
    pub company_name: Option<String>,
    /// RFC 3339 / ISO-8601, UTC
    pub upload_time: String,
    pub tags: Vec<TagResponse>,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub temporary_link: String,
    pub expires_at: String,
    pub name: String,
    pub description: Option<String>,
    pub company_id: u64,
    pub company_name: Option<String>,
    pub tags: Vec<TagResponse>,
    pub likes: u64,
    pub dislikes: u64,
    pub user_rating: i8,
    pub total_views: u64,
    pub unique_viewers: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatingRequest {
    /// -1 dislike, 0 clear, 1 like
    pub rating: i8,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub message: String,
    pub likes: u64,
    pub dislikes: u64,
    pub user_rating: i8,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListMediaParams {
    #[serde(default)]
    pub kind: Option<MediaKind>,
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn media_response(db: &Database, media: MediaRecord) -> Result<MediaResponse, ApiError> {
    let company_name = db.get_company(media.company_id)?.map(|c| c.name);
    let tags = db
        .get_tags(&media.tag_ids)?
        .into_iter()
        .map(TagResponse::from)
        .collect();

    Ok(MediaResponse {
        id: media.id,
        kind: media.kind(),
        upload_time: media.upload_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        name: media.name,
        description: media.description,
        company_id: media.company_id,
        company_name,
        tags,
    })
}

fn require_media(db: &Database, id: MediaId) -> Result<MediaRecord, ApiError> {
    db.get_media(id)?
        .ok_or_else(|| ApiError::not_found("Video not found"))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /media
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListMediaParams>,
) -> Result<Json<Vec<MediaResponse>>, ApiError> {
    let media = state.db.list_media(params.kind)?;
    let items = media
        .into_iter()
        .map(|m| media_response(&state.db, m))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

/// GET /media/tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.db.list_tags()?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// GET /media/:id/link
///
/// Counts as a view: the history entry is upserted before the link is minted,
/// so the returned totals include this request.
pub async fn issue_link(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<MediaId>,
) -> Result<Json<LinkResponse>, ApiError> {
    let media = require_media(&state.db, id)?;

    state.db.record_view(user.user_id, id, Utc::now())?;
    let stats = state.db.view_stats(id)?;
    let summary = state.db.rating_summary(id, user.user_id)?;

    let link = state.links.issue(id, &media.name).await?;
    tracing::info!(media_id = id, user_id = user.user_id, "Issued temporary link");

    let media = media_response(&state.db, media)?;
    Ok(Json(LinkResponse {
        temporary_link: link.url,
        expires_at: link.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        name: media.name,
        description: media.description,
        company_id: media.company_id,
        company_name: media.company_name,
        tags: media.tags,
        likes: summary.likes,
        dislikes: summary.dislikes,
        user_rating: summary.user_rating,
        total_views: stats.total_views,
        unique_viewers: stats.unique_viewers,
    }))
}

/// POST /media/:id/rating
pub async fn rate_media(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<MediaId>,
    AppJson(body): AppJson<RatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), ApiError> {
    if !(-1..=1).contains(&body.rating) {
        return Err(ApiError::bad_request("rating must be -1, 0 or 1"));
    }
    require_media(&state.db, id)?;

    let kind = RatingKind::from_sign(body.rating);
    let outcome = state.db.set_rating(user.user_id, id, kind, Utc::now())?;

    let (status, message) = match outcome {
        RatingOutcome::Unchanged => {
            return Err(ApiError::bad_request("Rating cannot be the same as before."))
        }
        RatingOutcome::Removed => (StatusCode::OK, "Rating removed"),
        RatingOutcome::NothingToRemove => (StatusCode::OK, "No rating to remove"),
        RatingOutcome::Added => (StatusCode::CREATED, "Rating added"),
        RatingOutcome::Updated => (StatusCode::CREATED, "Rating updated"),
    };
    tracing::info!(media_id = id, user_id = user.user_id, outcome = ?outcome, "Rating changed");

    let summary = state.db.rating_summary(id, user.user_id)?;
    Ok((
        status,
        Json(RatingResponse {
            message: message.to_string(),
            likes: summary.likes,
            dislikes: summary.dislikes,
            user_rating: summary.user_rating,
        }),
    ))
}
