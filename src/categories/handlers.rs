use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::AuthUser, Success},
    categories::{dto::CategoryRequest, repo_types::Category, services},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", delete(delete_category))
}

/// No session required.
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(Category::list(&state.db).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let Json(payload) = payload?;
    let category = services::validate(payload)?;

    match Category::create(&state.db, &category).await {
        Ok(created) => {
            info!(
                category_id = created.id,
                slug = %created.slug,
                user_id = identity.user_id,
                "category created"
            );
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(name = %category.name, slug = %category.slug, "duplicate category");
            Err(AppError::Conflict("category already exists".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn delete_category(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Success>> {
    let Path(id) = id?;
    if !Category::delete(&state.db, id).await? {
        return Err(AppError::NotFound("category"));
    }
    info!(category_id = id, user_id = identity.user_id, "category deleted");
    Ok(Json(Success::ok()))
}
