use std::path::Path as FsPath;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use crate::api::response::ApiError;
use crate::streaming::{self, ByteRange, DEFAULT_CONTENT_TYPE};
use crate::AppState;

/// GET /stream/:link_id/:filename
///
/// Unauthenticated; possession of a live link is the capability. Always
/// answers 206, serving the whole file when no Range header is sent.
pub async fn stream_media(
    State(state): State<Arc<AppState>>,
    Path((link_id, filename)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // Validate the range before touching the store or the filesystem.
    let range = match headers.get(header::RANGE) {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| ApiError::bad_request("Invalid range: header is not ASCII"))?;
            ByteRange::parse(raw)?
        }
        None => ByteRange::full(),
    };

    let media_id = state
        .links
        .resolve(&link_id, &filename)
        .await?
        .ok_or_else(|| ApiError::not_found("Invalid or expired link"))?;

    let media = state
        .db
        .get_media(media_id)?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let path = streaming::resolve_storage_path(FsPath::new(&state.config.storage.media_root), &media.storage_path);
    let (chunk, reader) = streaming::open_chunk(&path, range).await?;

    // Display names often lack an extension; fall back to the stored file's.
    let mut content_type = streaming::content_type_for(&filename);
    if content_type == DEFAULT_CONTENT_TYPE {
        content_type = streaming::content_type_for(&media.storage_path);
    }

    tracing::debug!(
        media_id,
        start = chunk.start,
        length = chunk.length,
        file_size = chunk.file_size,
        "Streaming chunk"
    );

    let mut response = (StatusCode::PARTIAL_CONTENT, Body::from_stream(ReaderStream::new(reader))).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(chunk.length));
    response_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Ok(value) = HeaderValue::from_str(&chunk.content_range()) {
        response_headers.insert(header::CONTENT_RANGE, value);
    }

    Ok(response)
}
