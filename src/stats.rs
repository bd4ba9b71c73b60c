use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::{extractors::AuthUser, repo_types::User},
    error::AppResult,
    products::repo_types::{PriceLeader, Product},
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub products: i64,
    pub users: i64,
    pub active_sessions: usize,
    pub total_value: f64,
    pub avg_price: f64,
    pub most_expensive: Option<PriceLeader>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

#[instrument(skip(state))]
pub async fn stats(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Stats>> {
    let totals = Product::totals(&state.db).await?;
    Ok(Json(Stats {
        products: totals.count,
        users: User::count(&state.db).await?,
        active_sessions: state.sessions.active_count(),
        total_value: totals.total,
        avg_price: totals.average,
        most_expensive: Product::most_expensive(&state.db).await?,
    }))
}
