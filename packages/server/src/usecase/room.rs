//! UseCase: ルームの作成・参加・マッチング
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MatchRoomUseCase / CreateRoomUseCase / JoinRoomUseCase の execute()
//! - 定員に達したときの game_start 通知
//!
//! ### なぜこのテストが必要か
//! - 定員到達の判定を誤ると、ゲームが始まらない・二重に始まる
//! - 不正なルーム ID がドメイン層まで届かないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：マッチング、作成、ID 指定での参加
//! - 異常系：着席済みプレイヤーの再リクエスト、存在しない・満員のルーム
//! - 異常系：ルーム ID の指定漏れ

use std::sync::Arc;

use crate::domain::{
    MessagePushError, MessagePusher, Player, Room, RoomId, RoomManager, RoomStatus,
};

use super::RoomRequestError;

/// 着席結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAssignment {
    /// 着席後のルーム
    pub room: Room,
    /// このリクエストでルームが定員に達し、ゲームが始まった
    pub started: bool,
}

impl From<Room> for RoomAssignment {
    fn from(room: Room) -> Self {
        let started = room.status == RoomStatus::Playing;
        Self { room, started }
    }
}

async fn broadcast_to_room(
    message_pusher: &dyn MessagePusher,
    room: &Room,
    message: &str,
) -> Result<(), MessagePushError> {
    message_pusher.broadcast(room.connections(), message).await
}

/// マッチメイキングのユースケース
pub struct MatchRoomUseCase {
    /// RoomManager（ルームとマッチメイキングの管理）
    room_manager: Arc<dyn RoomManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl MatchRoomUseCase {
    /// 新しい MatchRoomUseCase を作成
    pub fn new(room_manager: Arc<dyn RoomManager>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            room_manager,
            message_pusher,
        }
    }

    /// 最も古い Idle ルームに着席する（無ければ作成する）
    pub async fn execute(&self, player: Player) -> Result<RoomAssignment, RoomRequestError> {
        let room = self.room_manager.match_room(player).await?;
        Ok(room.into())
    }

    /// ルームの全員に game_start を送る
    pub async fn start_game(&self, room: &Room, message: &str) -> Result<(), MessagePushError> {
        broadcast_to_room(self.message_pusher.as_ref(), room, message).await
    }
}

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// RoomManager（ルームとマッチメイキングの管理）
    room_manager: Arc<dyn RoomManager>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(room_manager: Arc<dyn RoomManager>) -> Self {
        Self { room_manager }
    }

    /// 新しいルームを作成して着席する
    ///
    /// 作成したルームは Idle キューの末尾に入り、マッチングの対象にもなる。
    pub async fn execute(&self, player: Player) -> Result<Room, RoomRequestError> {
        Ok(self.room_manager.create_room(player).await?)
    }
}

/// ルーム ID 指定での参加のユースケース
pub struct JoinRoomUseCase {
    /// RoomManager（ルームとマッチメイキングの管理）
    room_manager: Arc<dyn RoomManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(room_manager: Arc<dyn RoomManager>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            room_manager,
            message_pusher,
        }
    }

    /// 指定したルームに着席する
    ///
    /// # Arguments
    ///
    /// * `player` - 着席するプレイヤー
    /// * `room_id` - クライアントが指定したルーム ID（未指定は BadRequest）
    pub async fn execute(
        &self,
        player: Player,
        room_id: Option<&str>,
    ) -> Result<RoomAssignment, RoomRequestError> {
        let room_id = room_id
            .ok_or_else(|| RoomRequestError::BadRequest("room_id is required".to_string()))?;
        let room_id = RoomId::new(room_id.to_string())?;
        let room = self.room_manager.join_room(&room_id, player).await?;
        Ok(room.into())
    }

    /// ルームの全員に game_start を送る
    pub async fn start_game(&self, room: &Room, message: &str) -> Result<(), MessagePushError> {
        broadcast_to_room(self.message_pusher.as_ref(), room, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, MockMessagePusher, RoomError, UserId},
        infrastructure::repository::InMemoryRoomManager,
    };
    use gamehall_shared::time::FixedClock;

    fn player(uid: u64) -> Player {
        Player::new(UserId::new(uid).unwrap(), ConnectionId::generate())
    }

    fn create_room_manager(capacity: usize) -> Arc<InMemoryRoomManager> {
        Arc::new(InMemoryRoomManager::new(
            capacity,
            Arc::new(FixedClock::new(1_700_000_000_000)),
        ))
    }

    #[tokio::test]
    async fn test_match_room_starts_game_when_full() {
        // テスト項目: 2 人目のマッチングでルームが定員に達し、ゲームが始まる
        // given (前提条件):
        let room_manager = create_room_manager(2);
        let usecase = MatchRoomUseCase::new(room_manager, Arc::new(MockMessagePusher::new()));
        let (alice, bob) = (player(1001), player(1002));

        // when (操作):
        let first = usecase.execute(alice).await.unwrap();
        let second = usecase.execute(bob).await.unwrap();

        // then (期待する結果):
        assert!(!first.started);
        assert_eq!(first.room.status, RoomStatus::Idle);
        assert!(second.started);
        assert_eq!(second.room.id, first.room.id);
        assert_eq!(second.room.user_ids(), vec![alice.user_id, bob.user_id]);
    }

    #[tokio::test]
    async fn test_match_room_rejects_seated_player() {
        // テスト項目: 着席済みのプレイヤーのマッチングは AlreadyInRoom になる
        // given (前提条件):
        let usecase =
            MatchRoomUseCase::new(create_room_manager(2), Arc::new(MockMessagePusher::new()));
        let alice = player(1001);
        let room = usecase.execute(alice).await.unwrap().room;

        // when (操作):
        let result = usecase.execute(alice).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RoomRequestError::Room(RoomError::AlreadyInRoom(
                1001,
                room.id.as_str().to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_start_game_broadcasts_to_every_member() {
        // テスト項目: game_start がルームの全員に送られる
        // given (前提条件):
        let room_manager = create_room_manager(2);
        let (alice, bob) = (player(1001), player(1002));
        room_manager.match_room(alice).await.unwrap();
        let room = room_manager.match_room(bob).await.unwrap();

        let mut pusher = MockMessagePusher::new();
        let expected = vec![alice.connection, bob.connection];
        pusher
            .expect_broadcast()
            .withf(move |targets, content| targets == &expected && content == "start")
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = MatchRoomUseCase::new(room_manager, Arc::new(pusher));

        // when (操作):
        let result = usecase.start_game(&room, "start").await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_room_then_join_by_id() {
        // テスト項目: 作成したルームに ID 指定で参加できる
        // given (前提条件):
        let room_manager = create_room_manager(2);
        let create = CreateRoomUseCase::new(room_manager.clone());
        let join = JoinRoomUseCase::new(room_manager, Arc::new(MockMessagePusher::new()));
        let (alice, bob) = (player(1001), player(1002));
        let created = create.execute(alice).await.unwrap();

        // when (操作):
        let joined = join
            .execute(bob, Some(created.id.as_str()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(created.status, RoomStatus::Idle);
        assert!(joined.started);
        assert_eq!(joined.room.id, created.id);
    }

    #[tokio::test]
    async fn test_join_room_errors() {
        // テスト項目: ルーム ID の指定漏れ、空の ID、存在しないルーム、満員のルームはエラーになる
        // given (前提条件):
        let room_manager = create_room_manager(2);
        let join = JoinRoomUseCase::new(room_manager.clone(), Arc::new(MockMessagePusher::new()));
        room_manager.match_room(player(1)).await.unwrap();
        let full = room_manager.match_room(player(2)).await.unwrap();

        // when (操作):
        let missing = join.execute(player(3), None).await;
        let blank = join.execute(player(3), Some("  ")).await;
        let not_found = join.execute(player(3), Some("no-such-room")).await;
        let not_joinable = join.execute(player(3), Some(full.id.as_str())).await;

        // then (期待する結果):
        assert!(matches!(missing, Err(RoomRequestError::BadRequest(_))));
        assert!(matches!(blank, Err(RoomRequestError::BadRequest(_))));
        assert!(matches!(
            not_found,
            Err(RoomRequestError::Room(RoomError::RoomNotFound(_)))
        ));
        assert!(matches!(
            not_joinable,
            Err(RoomRequestError::Room(RoomError::RoomNotJoinable(_)))
        ));
    }
}
