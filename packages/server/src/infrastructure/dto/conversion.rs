//! Conversion logic from domain entities to DTOs.

use gamehall_shared::time::millis_to_rfc3339;

use crate::domain::{Player, Room};
use crate::infrastructure::dto::http::{PlayerDetailDto, RoomDetailDto, RoomSummaryDto};

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            status: room.status.as_str().to_string(),
            players: room.user_ids().into_iter().map(u64::from).collect(),
            capacity: room.capacity,
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Player> for PlayerDetailDto {
    fn from(player: &Player) -> Self {
        Self {
            user_id: player.user_id.value(),
            connection: player.connection.to_string(),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            status: room.status.as_str().to_string(),
            players: room.players.iter().map(PlayerDetailDto::from).collect(),
            capacity: room.capacity,
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}
