//! MessagePusher trait 定義
//!
//! サーバーからクライアントへのメッセージ送信（プッシュ通知）の抽象化。
//! 具体的な実装は Infrastructure 層が提供します（WebSocket など）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// 1 接続分の送信チャンネル
///
/// 受信側は接続ごとに 1 つの書き込みタスクが保持するため、
/// 同一接続への書き込みは常に直列化される。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ送信の抽象化
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    ///
    /// チャンネルを破棄すると、その接続の書き込みタスクが終了する。
    async fn unregister_client(&self, connection: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(&self, connection: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// 複数の接続にメッセージを送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
