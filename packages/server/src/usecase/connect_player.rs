//! UseCase: プレイヤー接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectPlayerUseCase::execute() メソッド
//! - レジストリへの登録と送信チャンネルの登録
//! - 同じユーザーの再接続（古い接続の置き換え）
//!
//! ### なぜこのテストが必要か
//! - 1 つの UserId に対して生きている接続は常に 1 つでなければならない
//! - 置き換えられた古い接続の席と送信チャンネルが残ると、通知が古い接続に届いてしまう
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規プレイヤーの接続
//! - 正常系：同じ UserId での再接続（後勝ち）
//! - エッジケース：Playing ルームに居るユーザーの再接続（ゲームは放棄される）

use std::sync::Arc;

use crate::domain::{MessagePusher, Player, PlayerRegistry, PusherChannel, RoomManager};

use super::DisconnectOutcome;

/// プレイヤー接続のユースケース
pub struct ConnectPlayerUseCase {
    /// PlayerRegistry（接続中プレイヤーの管理）
    registry: Arc<dyn PlayerRegistry>,
    /// RoomManager（ルームとマッチメイキングの管理）
    room_manager: Arc<dyn RoomManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectPlayerUseCase {
    /// 新しい ConnectPlayerUseCase を作成
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

    /// プレイヤー接続を実行
    ///
    /// # Arguments
    ///
    /// * `player` - 接続するプレイヤー（Domain Model）
    /// * `sender` - プレイヤーへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 同じ UserId の古い接続を置き換えた場合、その接続の解放結果。
    /// 古い接続の送信チャンネルは破棄されるため、古いセッションは自然に終了する。
    pub async fn execute(&self, player: Player, sender: PusherChannel) -> Option<DisconnectOutcome> {
        // 1. レジストリに登録（後勝ち）
        let replaced = self
            .registry
            .join(player)
            .await
            .filter(|old| old.connection != player.connection);

        // 2. 置き換えた古い接続の席と送信チャンネルを解放
        let superseded = match replaced {
            Some(old) => {
                let departure = self.room_manager.remove_player(&old).await;
                self.message_pusher.unregister_client(&old.connection).await;
                tracing::info!(
                    user_id = %old.user_id,
                    old_connection = %old.connection,
                    new_connection = %player.connection,
                    "player reconnected, previous connection superseded"
                );
                Some(DisconnectOutcome {
                    player: old,
                    deregistered: true,
                    departure,
                })
            }
            None => None,
        };

        // 3. MessagePusher に送信チャンネルを登録
        self.message_pusher
            .register_client(player.connection, sender)
            .await;

        superseded
    }
}
