//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RoomError, ValueObjectError};

/// ルーム操作（作成・参加・マッチング）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomRequestError {
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<ValueObjectError> for RoomRequestError {
    fn from(error: ValueObjectError) -> Self {
        RoomRequestError::BadRequest(error.to_string())
    }
}

/// ゲームデータ中継のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("player {0} is not in a room")]
    NotInRoom(u64),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room not found")]
    RoomNotFound,
}

/// プレイヤー状態取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetPlayerStatusError {
    #[error("player not connected")]
    PlayerNotFound,
}
