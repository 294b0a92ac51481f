use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::{
    error::{ApiResult, AppError},
    models::Tour,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tours", get(list_tours))
        .route("/tours/{tour_id}", get(get_tour))
}

// GET /api/tours
async fn list_tours(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Tour>>> {
    Ok(Json(state.db.tours.list().await?))
}

// GET /api/tours/{tour_id}
async fn get_tour(
    State(state): State<Arc<AppState>>,
    Path(tour_id): Path<String>,
) -> ApiResult<Json<Tour>> {
    state
        .db
        .tours
        .find(&tour_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))
}
