//! UseCase: プレイヤー切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectPlayerUseCase::execute() メソッド
//! - レジストリからの削除、ルームからの退出、送信チャンネルの解放
//! - 放棄されたゲームの残りのプレイヤーへの game_end 通知
//!
//! ### なぜこのテストが必要か
//! - 切断後にプレイヤーやルームの席が残ると、再マッチングできなくなる
//! - 再接続で置き換えられた古いセッションの後始末が、新しい接続を壊さないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルームに居ないプレイヤーの切断
//! - 正常系：Playing ルームのプレイヤーの切断（残りのプレイヤーに通知）
//! - エッジケース：同じプレイヤーの 2 回目の切断（冪等）
//! - エッジケース：再接続で置き換えられた古い接続の切断

use std::sync::Arc;

use crate::domain::{
    MessagePushError, MessagePusher, Player, PlayerRegistry, Room, RoomDeparture, RoomManager,
};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// 切断したプレイヤー
    pub player: Player,
    /// レジストリから削除されたか（既に置き換えられていた場合は false）
    pub deregistered: bool,
    /// ルームから退出した場合、その結果
    pub departure: Option<RoomDeparture>,
}

impl DisconnectOutcome {
    /// 退出によってゲームが放棄された場合、そのルーム（残りのプレイヤーを含む）
    pub fn abandoned_room(&self) -> Option<&Room> {
        self.departure
            .as_ref()
            .filter(|departure| departure.abandoned())
            .map(|departure| &departure.room)
    }
}

/// プレイヤー切断のユースケース
pub struct DisconnectPlayerUseCase {
    /// PlayerRegistry（接続中プレイヤーの管理）
    registry: Arc<dyn PlayerRegistry>,
    /// RoomManager（ルームとマッチメイキングの管理）
    room_manager: Arc<dyn RoomManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectPlayerUseCase {
    /// 新しい DisconnectPlayerUseCase を作成
    pub fn new(
        registry: Arc<dyn PlayerRegistry>,
        room_manager: Arc<dyn RoomManager>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            room_manager,
            message_pusher,
        }
    }

    /// プレイヤー切断を実行
    ///
    /// レジストリ → ルーム → 送信チャンネルの順に解放する。どの手順も
    /// 接続 ID が一致する場合のみ作用するため、何度呼んでも安全。
    pub async fn execute(&self, player: Player) -> DisconnectOutcome {
        // 1. レジストリから削除
        let deregistered = self.registry.leave(&player).await;

        // 2. ルームから退出
        let departure = self.room_manager.remove_player(&player).await;

        // 3. 送信チャンネルを解放
        self.message_pusher
            .unregister_client(&player.connection)
            .await;

        DisconnectOutcome {
            player,
            deregistered,
            departure,
        }
    }

    /// ゲームが放棄された場合、残りのプレイヤーに通知する
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 通知した
    /// * `Ok(false)` - 通知対象なし
    pub async fn notify_abandoned(
        &self,
        outcome: &DisconnectOutcome,
        message: &str,
    ) -> Result<bool, MessagePushError> {
        let Some(room) = outcome.abandoned_room() else {
            return Ok(false);
        };
        self.message_pusher
            .broadcast(room.connections(), message)
            .await?;
        Ok(true)
    }
}
