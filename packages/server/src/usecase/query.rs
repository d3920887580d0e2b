//! UseCase: ルームとプレイヤーの参照（HTTP API 用）

use std::sync::Arc;

use crate::domain::{Player, PlayerRegistry, Room, RoomId, RoomManager, UserId};

use super::{GetPlayerStatusError, GetRoomDetailError};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    room_manager: Arc<dyn RoomManager>,
}

impl GetRoomsUseCase {
    pub fn new(room_manager: Arc<dyn RoomManager>) -> Self {
        Self { room_manager }
    }

    /// Idle ルーム（FIFO 順）、続いて Playing ルーム
    pub async fn execute(&self) -> Vec<Room> {
        self.room_manager.list_rooms().await
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    room_manager: Arc<dyn RoomManager>,
}

impl GetRoomDetailUseCase {
    pub fn new(room_manager: Arc<dyn RoomManager>) -> Self {
        Self { room_manager }
    }

    pub async fn execute(&self, room_id: String) -> Result<Room, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomDetailError::RoomNotFound)?;
        self.room_manager
            .get_room(&room_id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}

/// 接続中プレイヤーの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub player: Player,
    /// 着席中のルーム
    pub room: Option<Room>,
}

/// プレイヤー状態取得のユースケース
pub struct GetPlayerStatusUseCase {
    registry: Arc<dyn PlayerRegistry>,
    room_manager: Arc<dyn RoomManager>,
}

impl GetPlayerStatusUseCase {
    pub fn new(registry: Arc<dyn PlayerRegistry>, room_manager: Arc<dyn RoomManager>) -> Self {
        Self {
            registry,
            room_manager,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<PlayerStatus, GetPlayerStatusError> {
        let player = self
            .registry
            .lookup(user_id)
            .await
            .ok_or(GetPlayerStatusError::PlayerNotFound)?;
        let room = self.room_manager.room_of(user_id).await;
        Ok(PlayerStatus { player, room })
    }
}
