//! Repository trait 定義
//!
//! ドメイン層が必要とする状態管理のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## ロック順序
//!
//! 実装はそれぞれ独自のロックを持つ。1 つの操作で複数のロックが必要な場合は
//! 必ず PlayerRegistry → RoomManager → MessagePusher の順で取得すること。
//! 現在のユースケースは 2 つ以上のロックを同時に保持しない。

use async_trait::async_trait;

use super::{Player, Room, RoomDeparture, RoomError, RoomId, UserId};

/// 接続中プレイヤーのレジストリ
///
/// UserId と ConnectionId の 2 つの索引を常に全単射で保つ。
#[async_trait]
pub trait PlayerRegistry: Send + Sync {
    /// プレイヤーを登録する
    ///
    /// 同じ UserId が既に登録されている場合は置き換え（後勝ち）、
    /// 置き換えられたプレイヤーを返す。再接続か競合かの判断は呼び出し側が行う。
    async fn join(&self, player: Player) -> Option<Player>;

    /// プレイヤーの登録を解除する
    ///
    /// 冪等。登録されているのが同じ接続の場合のみ削除し、削除したら `true`。
    async fn leave(&self, player: &Player) -> bool;

    /// UserId でプレイヤーを検索
    async fn lookup(&self, user_id: UserId) -> Option<Player>;

    /// 接続中のプレイヤー数
    async fn count(&self) -> usize;
}

/// ルームのライフサイクルとマッチメイキングを管理する
#[async_trait]
pub trait RoomManager: Send + Sync {
    /// ルームの定員
    fn capacity(&self) -> usize;

    /// マッチメイキング
    ///
    /// 最も古い Idle ルームにプレイヤーを追加する（FIFO）。Idle ルームが無ければ
    /// 新しいルームを作成する。定員に達したルームは Playing に遷移する。
    async fn match_room(&self, player: Player) -> Result<Room, RoomError>;

    /// 明示的にルームを作成（Idle キューの末尾に追加）
    async fn create_room(&self, player: Player) -> Result<Room, RoomError>;

    /// ルーム ID を指定して参加
    async fn join_room(&self, room_id: &RoomId, player: Player) -> Result<Room, RoomError>;

    /// プレイヤーを現在のルームから退出させる
    ///
    /// ルームに居ない、または別の接続で着席している場合は `None`。
    async fn remove_player(&self, player: &Player) -> Option<RoomDeparture>;

    /// ゲーム終了: Playing のルームを Finished にして回収する
    async fn finish_room(&self, room_id: &RoomId) -> Result<Room, RoomError>;

    /// プレイヤーが着席しているルーム
    async fn room_of(&self, user_id: UserId) -> Option<Room>;

    /// ルームを取得
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// 全ルームを取得（Idle を FIFO 順に、続いて Playing）
    async fn list_rooms(&self) -> Vec<Room>;
}
