use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::AuthUser, Success},
    error::{AppError, AppResult},
    products::{
        dto::{Created, ProductRequest},
        query::{ProductFilter, ProductListParams},
        repo_types::Product,
        services,
    },
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/related", get(related_products))
}

#[instrument(skip(state))]
pub async fn list_products(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
    params: Result<Query<ProductListParams>, QueryRejection>,
) -> AppResult<Json<Vec<Product>>> {
    let Query(params) = params?;
    let filter = ProductFilter::from(params);
    let products = Product::list(&state.db, &filter).await?;
    Ok(Json(products))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let Json(payload) = payload?;
    let product = services::validate(payload)?;
    let id = Product::create(&state.db, &product)
        .await
        .map_err(services::map_write_error)?;

    info!(product_id = id, user_id = identity.user_id, "product created");
    Ok((StatusCode::CREATED, Json(Created { success: true, id })))
}

#[instrument(skip(state))]
pub async fn get_product(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Product>> {
    let Path(id) = id?;
    Product::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("product"))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> AppResult<Json<Success>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let product = services::validate(payload)?;
    let updated = Product::replace(&state.db, id, &product)
        .await
        .map_err(services::map_write_error)?;
    if !updated {
        return Err(AppError::NotFound("product"));
    }

    info!(product_id = id, user_id = identity.user_id, "product updated");
    Ok(Json(Success::ok()))
}

#[instrument(skip(state))]
pub async fn delete_product(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Success>> {
    let Path(id) = id?;
    if !Product::delete(&state.db, id).await? {
        warn!(product_id = id, "delete of missing product");
        return Err(AppError::NotFound("product"));
    }
    info!(product_id = id, user_id = identity.user_id, "product deleted");
    Ok(Json(Success::ok()))
}

#[instrument(skip(state))]
pub async fn related_products(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Vec<Product>>> {
    let Path(id) = id?;
    Product::related(&state.db, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("product"))
}
