//! UseCase: ゲームデータの中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SyncUseCase::execute() / relay() メソッド
//!
//! ### なぜこのテストが必要か
//! - ゲームデータは同じルームの他のプレイヤーにだけ届かなければならない
//! - 置き換えられた古い接続からのデータが新しい席に紛れ込まないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム内の他のプレイヤーへの中継
//! - 異常系：ルームに居ないプレイヤー、古い接続からの送信

use std::sync::Arc;

use crate::domain::{MessagePushError, MessagePusher, Player, Room, RoomManager};

use super::SyncError;

/// ゲームデータ中継のユースケース
pub struct SyncUseCase {
    /// RoomManager（ルームとマッチメイキングの管理）
    room_manager: Arc<dyn RoomManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SyncUseCase {
    /// 新しい SyncUseCase を作成
    pub fn new(room_manager: Arc<dyn RoomManager>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            room_manager,
            message_pusher,
        }
    }

    /// 送信者が着席しているルームを取得
    ///
    /// 着席しているのが同じ接続でない場合は NotInRoom。
    pub async fn execute(&self, player: Player) -> Result<Room, SyncError> {
        self.room_manager
            .room_of(player.user_id)
            .await
            .filter(|room| room.players.contains(&player))
            .ok_or(SyncError::NotInRoom(player.user_id.value()))
    }

    /// 送信者以外のメンバーにメッセージを中継
    ///
    /// # Returns
    ///
    /// 中継した接続の数
    pub async fn relay(
        &self,
        room: &Room,
        sender: &Player,
        message: &str,
    ) -> Result<usize, MessagePushError> {
        let targets = room.connections_except(sender.user_id);
        let count = targets.len();
        if count > 0 {
            self.message_pusher.broadcast(targets, message).await?;
        }
        Ok(count)
    }
}
