use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::AuthUser, Success},
    error::{AppError, AppResult},
    photos::repo,
    state::AppState,
};

/// Multipart field carrying the image.
pub const PHOTO_FIELD: &str = "foto";

pub fn photo_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/products/:id/photo", post(upload_photo).get(download_photo))
        .layer(DefaultBodyLimit::max(max_bytes))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::validation(PHOTO_FIELD, e.body_text())
    }
}

async fn read_photo_field(mut mp: Multipart) -> AppResult<Option<Bytes>> {
    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(PHOTO_FIELD) {
            let data = field.bytes().await.map_err(multipart_error)?;
            return Ok(Some(data));
        }
    }
    Ok(None)
}

/// POST /products/:id/photo (multipart, field `foto`)
#[instrument(skip(state, mp))]
pub async fn upload_photo(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Success>> {
    let Path(id) = id?;
    let mp = mp.map_err(|e| AppError::validation(PHOTO_FIELD, e.body_text()))?;
    let data = match read_photo_field(mp).await? {
        Some(d) if !d.is_empty() => d,
        _ => return Err(AppError::validation(PHOTO_FIELD, "foto is required")),
    };

    if !repo::set_photo(&state.db, id, &data).await? {
        warn!(product_id = id, "photo upload for missing product");
        return Err(AppError::NotFound("product"));
    }
    info!(product_id = id, user_id = identity.user_id, bytes = data.len(), "photo stored");
    Ok(Json(Success::ok()))
}

#[instrument(skip(state))]
pub async fn download_photo(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = id?;
    let bytes = repo::get_photo(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("photo"))?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "public, max-age=60"),
        ],
        bytes,
    ))
}
