//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::UserId,
    infrastructure::dto::http::{PlayerStatusDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::{GetPlayerStatusError, GetRoomDetailError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms.execute().await;
    // Domain Model から DTO への変換
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail.execute(room_id).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(&room))),
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}

/// Get a connected player and the room it is seated in
pub async fn get_player_status(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<PlayerStatusDto>, StatusCode> {
    let user_id = UserId::parse(&uid).map_err(|_| StatusCode::BAD_REQUEST)?;
    match state.get_player_status.execute(user_id).await {
        Ok(status) => Ok(Json(PlayerStatusDto {
            user_id: status.player.user_id.value(),
            room_id: status.room.map(|room| room.id.into_string()),
        })),
        Err(GetPlayerStatusError::PlayerNotFound) => Err(StatusCode::NOT_FOUND),
    }
}
