pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router(max_bytes: usize) -> Router<AppState> {
    handlers::photo_routes(max_bytes)
}
