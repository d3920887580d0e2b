//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Entry of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub status: String,
    /// User ids in join order
    pub players: Vec<u64>,
    pub capacity: usize,
    /// RFC 3339
    pub created_at: String,
}

/// Member entry of `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetailDto {
    pub user_id: u64,
    pub connection: String,
}

/// Response of `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub status: String,
    pub players: Vec<PlayerDetailDto>,
    pub capacity: usize,
    pub created_at: String,
}

/// Response of `GET /api/players/{uid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatusDto {
    pub user_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}
