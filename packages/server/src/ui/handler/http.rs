//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    hub::{HubError, RoomSummary},
    infrastructure::dto::http::RoomSummaryDto,
    ui::state::AppState,
};

async fn room_summaries(state: &AppState) -> Result<Vec<RoomSummary>, StatusCode> {
    state.hub.rooms().await.map_err(|e: HubError| {
        tracing::error!("Failed to inspect rooms: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    let rooms = room_summaries(&state).await?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.into_iter().map(RoomSummaryDto::from).collect()))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummaryDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    room_summaries(&state)
        .await?
        .into_iter()
        .find(|summary| summary.room_id == room_id)
        .map(|summary| Json(RoomSummaryDto::from(summary)))
        .ok_or(StatusCode::NOT_FOUND)
}
