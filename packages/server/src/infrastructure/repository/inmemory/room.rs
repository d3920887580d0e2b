//! InMemory RoomManager 実装
//!
//! Idle キュー（FIFO）、Playing 集合、ルーム本体、プレイヤー → ルームの索引を
//! 1 つの Mutex で保護します。着席状態の変更はすべてこのロックの内側で行うため、
//! 並行したマッチメイキングが同じ席を二重に埋めることはありません。
//!
//! ## 退出ポリシー
//!
//! - ルームが空になった: どのコレクションからも削除して破棄
//! - Idle ルームに残りのプレイヤーがいる: Idle のまま、キュー内の位置も維持
//! - Playing ルームが定員を割った: Finished（放棄）として回収し、残りのプレイヤーを解放
//!
//! Finished になったルームは即座に回収され、管理対象から外れます。

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use gamehall_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    Player, Room, RoomDeparture, RoomError, RoomId, RoomIdFactory, RoomManager, RoomStatus,
    Timestamp, UserId,
};

#[derive(Debug, Default)]
struct RoomBook {
    rooms: HashMap<RoomId, Room>,
    /// Idle ルーム（作成順、先頭が最も古い）
    idle_rooms: VecDeque<RoomId>,
    playing_rooms: HashSet<RoomId>,
    /// プレイヤー → 着席中のルーム
    seats: HashMap<UserId, RoomId>,
}

impl RoomBook {
    fn ensure_not_seated(&self, user_id: UserId) -> Result<(), RoomError> {
        match self.seats.get(&user_id) {
            Some(room_id) => Err(RoomError::AlreadyInRoom(
                user_id.value(),
                room_id.as_str().to_string(),
            )),
            None => Ok(()),
        }
    }

    fn open(&mut self, mut room: Room) -> Room {
        for player in &room.players {
            self.seats.insert(player.user_id, room.id.clone());
        }
        if room.is_full() {
            room.status = RoomStatus::Playing;
            self.playing_rooms.insert(room.id.clone());
        } else {
            self.idle_rooms.push_back(room.id.clone());
        }
        self.rooms.insert(room.id.clone(), room.clone());
        room
    }

    fn seat(&mut self, room_id: &RoomId, player: Player) -> Result<Room, RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.as_str().to_string()))?;
        if room.status != RoomStatus::Idle || room.is_full() {
            return Err(RoomError::RoomNotJoinable(room_id.as_str().to_string()));
        }

        room.players.push(player);
        self.seats.insert(player.user_id, room_id.clone());

        if room.is_full() {
            room.status = RoomStatus::Playing;
            self.idle_rooms.retain(|id| id != room_id);
            self.playing_rooms.insert(room_id.clone());
        }
        Ok(room.clone())
    }

    fn unseat(&mut self, player: &Player) -> Option<RoomDeparture> {
        let room_id = self.seats.get(&player.user_id)?.clone();
        let room = self.rooms.get_mut(&room_id)?;
        let position = room
            .players
            .iter()
            .position(|p| p.user_id == player.user_id && p.connection == player.connection)?;

        room.players.remove(position);
        let (now_empty, status) = (room.is_empty(), room.status);
        self.seats.remove(&player.user_id);

        if now_empty {
            let mut room = self.reclaim(&room_id)?;
            room.status = RoomStatus::Finished;
            return Some(RoomDeparture {
                room,
                reclaimed: true,
            });
        }

        match status {
            RoomStatus::Playing => Some(RoomDeparture {
                room: self.finish(&room_id)?,
                reclaimed: true,
            }),
            RoomStatus::Idle | RoomStatus::Finished => Some(RoomDeparture {
                room: self.rooms.get(&room_id)?.clone(),
                reclaimed: false,
            }),
        }
    }

    /// Playing → Finished に遷移させ、メンバーを解放して回収する
    fn finish(&mut self, room_id: &RoomId) -> Option<Room> {
        let mut room = self.reclaim(room_id)?;
        room.status = RoomStatus::Finished;
        for player in &room.players {
            if self.seats.get(&player.user_id) == Some(room_id) {
                self.seats.remove(&player.user_id);
            }
        }
        Some(room)
    }

    fn reclaim(&mut self, room_id: &RoomId) -> Option<Room> {
        let room = self.rooms.remove(room_id)?;
        self.idle_rooms.retain(|id| id != room_id);
        self.playing_rooms.remove(room_id);
        Some(room)
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        let idle: HashSet<&RoomId> = self.idle_rooms.iter().collect();
        assert_eq!(idle.len(), self.idle_rooms.len(), "duplicate idle entry");
        assert!(idle.iter().all(|id| !self.playing_rooms.contains(*id)));
        assert_eq!(
            idle.len() + self.playing_rooms.len(),
            self.rooms.len(),
            "every room is in exactly one collection"
        );

        let mut seated = 0;
        for (id, room) in &self.rooms {
            assert!(!room.is_empty());
            assert!(room.players.len() <= room.capacity);
            match room.status {
                RoomStatus::Idle => assert!(idle.contains(id) && !room.is_full()),
                RoomStatus::Playing => assert!(self.playing_rooms.contains(id) && room.is_full()),
                RoomStatus::Finished => panic!("finished room '{id}' was not reclaimed"),
            }
            for player in &room.players {
                assert_eq!(self.seats.get(&player.user_id), Some(id));
                seated += 1;
            }
        }
        assert_eq!(seated, self.seats.len(), "a player is seated in two rooms");
    }
}

/// インメモリ RoomManager 実装
pub struct InMemoryRoomManager {
    capacity: usize,
    clock: Arc<dyn Clock>,
    book: Mutex<RoomBook>,
}

impl InMemoryRoomManager {
    /// 新しい InMemoryRoomManager を作成
    ///
    /// `capacity` は 1 ルームあたりの人数。0 は 1 として扱う。
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity: capacity.max(1),
            clock,
            book: Mutex::new(RoomBook::default()),
        }
    }

    fn new_room(&self, player: Player) -> Room {
        Room::new(
            RoomIdFactory::generate(),
            player,
            self.capacity,
            Timestamp::new(self.clock.now_millis()),
        )
    }
}

#[async_trait]
impl RoomManager for InMemoryRoomManager {
    fn capacity(&self) -> usize {
        self.capacity
    }

    async fn match_room(&self, player: Player) -> Result<Room, RoomError> {
        let mut book = self.book.lock().await;
        book.ensure_not_seated(player.user_id)?;

        let room = match book.idle_rooms.front().cloned() {
            Some(room_id) => book.seat(&room_id, player)?,
            None => book.open(self.new_room(player)),
        };

        tracing::debug!(
            user_id = %player.user_id,
            room_id = %room.id,
            status = room.status.as_str(),
            players = room.players.len(),
            "player matched into room"
        );
        Ok(room)
    }

    async fn create_room(&self, player: Player) -> Result<Room, RoomError> {
        let mut book = self.book.lock().await;
        book.ensure_not_seated(player.user_id)?;
        let room = book.open(self.new_room(player));
        tracing::debug!(user_id = %player.user_id, room_id = %room.id, "room created");
        Ok(room)
    }

    async fn join_room(&self, room_id: &RoomId, player: Player) -> Result<Room, RoomError> {
        let mut book = self.book.lock().await;
        book.ensure_not_seated(player.user_id)?;
        let room = book.seat(room_id, player)?;
        tracing::debug!(
            user_id = %player.user_id,
            room_id = %room.id,
            status = room.status.as_str(),
            "player joined room"
        );
        Ok(room)
    }

    async fn remove_player(&self, player: &Player) -> Option<RoomDeparture> {
        let departure = self.book.lock().await.unseat(player)?;
        tracing::debug!(
            user_id = %player.user_id,
            room_id = %departure.room.id,
            status = departure.room.status.as_str(),
            reclaimed = departure.reclaimed,
            "player removed from room"
        );
        Some(departure)
    }

    async fn finish_room(&self, room_id: &RoomId) -> Result<Room, RoomError> {
        let mut book = self.book.lock().await;
        match book.rooms.get(room_id) {
            None => return Err(RoomError::RoomNotFound(room_id.as_str().to_string())),
            Some(room) if room.status != RoomStatus::Playing => {
                return Err(RoomError::RoomNotPlaying(room_id.as_str().to_string()));
            }
            Some(_) => {}
        }
        let room = book
            .finish(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.as_str().to_string()))?;
        tracing::debug!(room_id = %room.id, "room finished and reclaimed");
        Ok(room)
    }

    async fn room_of(&self, user_id: UserId) -> Option<Room> {
        let book = self.book.lock().await;
        let room_id = book.seats.get(&user_id)?;
        book.rooms.get(room_id).cloned()
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        self.book.lock().await.rooms.get(room_id).cloned()
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let book = self.book.lock().await;
        let mut playing: Vec<Room> = book
            .playing_rooms
            .iter()
            .filter_map(|id| book.rooms.get(id).cloned())
            .collect();
        playing.sort_by_key(|room| room.created_at);

        book.idle_rooms
            .iter()
            .filter_map(|id| book.rooms.get(id).cloned())
            .chain(playing)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionId;
    use gamehall_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - マッチメイキング（FIFO、定員到達で Playing）
    // - 明示的な作成・参加
    // - 退出ポリシー（空ルームの破棄、Playing ルームの放棄）
    // - 並行マッチメイキングの安全性（同じ席の二重割り当てが無い）
    //
    // 【なぜこのテストが必要か】
    // - ルームの着席状態はすべてのゲーム機能の前提になる
    // - 切断時にルームから外れないと、幽霊プレイヤーが残り続ける
    // ========================================

    fn manager(capacity: usize) -> InMemoryRoomManager {
        InMemoryRoomManager::new(capacity, Arc::new(FixedClock::new(1_700_000_000_000)))
    }

    fn player(uid: u64) -> Player {
        Player::new(UserId::new(uid).unwrap(), ConnectionId::generate())
    }

    async fn check(manager: &InMemoryRoomManager) {
        manager.book.lock().await.check_invariants();
    }

    #[tokio::test]
    async fn test_match_room_creates_idle_room_when_none_waiting() {
        // テスト項目: Idle ルームが無い場合、新しい Idle ルームが作成される
        // given (前提条件):
        let manager = manager(2);
        let alice = player(1001);

        // when (操作):
        let room = manager.match_room(alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.status, RoomStatus::Idle);
        assert_eq!(room.players, vec![alice]);
        assert_eq!(room.created_at, Timestamp::new(1_700_000_000_000));
        assert_eq!(manager.room_of(alice.user_id).await, Some(room));
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_sequential_matches_pair_into_same_playing_room() {
        // テスト項目: 連続した 2 回のマッチで同じルームに入り、Playing になる
        // given (前提条件):
        let manager = manager(2);
        let alice = player(1001);
        let bob = player(1002);

        // when (操作):
        let first = manager.match_room(alice).await.unwrap();
        let second = manager.match_room(bob).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id, second.id);
        assert_eq!(second.status, RoomStatus::Playing);
        assert_eq!(second.players, vec![alice, bob]);
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_match_room_fills_oldest_idle_room_first() {
        // テスト項目: Idle ルームは作成の古い順に埋められる（FIFO）
        // given (前提条件): 定員 3 で、明示的に 3 つのルームを作成
        let manager = manager(3);
        let r1 = manager.create_room(player(1)).await.unwrap();
        let r2 = manager.create_room(player(2)).await.unwrap();
        let r3 = manager.create_room(player(3)).await.unwrap();

        // when (操作):
        let m1 = manager.match_room(player(4)).await.unwrap();
        let m2 = manager.match_room(player(5)).await.unwrap();
        let m3 = manager.match_room(player(6)).await.unwrap();
        let m4 = manager.match_room(player(7)).await.unwrap();

        // then (期待する結果): r1 が満員になるまで r1、その後 r2、r3 の順
        assert_eq!(m1.id, r1.id);
        assert_eq!(m2.id, r1.id);
        assert_eq!(m2.status, RoomStatus::Playing);
        assert_eq!(m3.id, r2.id);
        assert_eq!(m3.status, RoomStatus::Idle);
        assert_eq!(m4.id, r2.id);
        assert_eq!(m4.status, RoomStatus::Playing);

        let rooms = manager.list_rooms().await;
        assert_eq!(rooms[0].id, r3.id);
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_room_stays_idle_until_capacity_reached() {
        // テスト項目: 定員 N のルームは N 人目が入るまで Idle のまま
        // given (前提条件):
        let manager = manager(4);

        // when (操作):
        let mut statuses = Vec::new();
        for uid in 1..=4 {
            statuses.push(manager.match_room(player(uid)).await.unwrap().status);
        }

        // then (期待する結果):
        assert_eq!(
            statuses,
            vec![
                RoomStatus::Idle,
                RoomStatus::Idle,
                RoomStatus::Idle,
                RoomStatus::Playing
            ]
        );
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_match_room_rejects_already_seated_player() {
        // テスト項目: 既にルームに着席しているプレイヤーはマッチできない
        // given (前提条件):
        let manager = manager(2);
        let alice = player(1001);
        let room = manager.match_room(alice).await.unwrap();

        // when (操作):
        let result = manager.match_room(alice).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RoomError::AlreadyInRoom(1001, room.id.as_str().to_string()))
        );
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_join_room_by_id() {
        // テスト項目: ルーム ID を指定して参加でき、満員で Playing になる
        // given (前提条件):
        let manager = manager(2);
        let _older = manager.create_room(player(1)).await.unwrap();
        let target = manager.create_room(player(2)).await.unwrap();

        // when (操作):
        let room = manager.join_room(&target.id, player(3)).await.unwrap();

        // then (期待する結果): FIFO の順序に関係なく指定したルームに入る
        assert_eq!(room.id, target.id);
        assert_eq!(room.status, RoomStatus::Playing);
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_join_room_errors() {
        // テスト項目: 存在しない・満員のルームへの参加はエラーになる
        // given (前提条件):
        let manager = manager(2);
        let full = manager.match_room(player(1)).await.unwrap();
        manager.match_room(player(2)).await.unwrap();
        let missing = RoomId::new("missing".to_string()).unwrap();

        // when (操作):
        let not_found = manager.join_room(&missing, player(3)).await;
        let not_joinable = manager.join_room(&full.id, player(3)).await;

        // then (期待する結果):
        assert_eq!(
            not_found,
            Err(RoomError::RoomNotFound("missing".to_string()))
        );
        assert_eq!(
            not_joinable,
            Err(RoomError::RoomNotJoinable(full.id.as_str().to_string()))
        );
        assert_eq!(manager.room_of(UserId::new(3).unwrap()).await, None);
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_remove_last_player_discards_room() {
        // テスト項目: 最後のプレイヤーが退出すると Idle ルームが破棄される
        // given (前提条件):
        let manager = manager(2);
        let alice = player(1001);
        let room = manager.match_room(alice).await.unwrap();

        // when (操作):
        let departure = manager.remove_player(&alice).await.unwrap();

        // then (期待する結果):
        assert!(departure.reclaimed);
        assert!(!departure.abandoned());
        assert_eq!(manager.get_room(&room.id).await, None);
        assert!(manager.list_rooms().await.is_empty());
        check(&manager).await;

        // 次のマッチでは新しいルームが作成される
        let next = manager.match_room(player(1002)).await.unwrap();
        assert_ne!(next.id, room.id);
    }

    #[tokio::test]
    async fn test_remove_from_idle_room_keeps_queue_position() {
        // テスト項目: Idle ルームから 1 人抜けてもキューの位置は維持される
        // given (前提条件):
        let manager = manager(3);
        let alice = player(1);
        let bob = player(2);
        let r1 = manager.match_room(alice).await.unwrap();
        manager.match_room(bob).await.unwrap();
        let r2 = manager.create_room(player(3)).await.unwrap();

        // when (操作):
        let departure = manager.remove_player(&alice).await.unwrap();
        let next = manager.match_room(player(4)).await.unwrap();

        // then (期待する結果):
        assert!(!departure.reclaimed);
        assert_eq!(departure.room.players, vec![bob]);
        assert_eq!(departure.room.status, RoomStatus::Idle);
        assert_eq!(next.id, r1.id);
        assert_ne!(next.id, r2.id);
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_remove_from_playing_room_abandons_it() {
        // テスト項目: Playing ルームから抜けると Finished（放棄）として回収され、残りは解放される
        // given (前提条件):
        let manager = manager(2);
        let alice = player(1001);
        let bob = player(1002);
        manager.match_room(alice).await.unwrap();
        let room = manager.match_room(bob).await.unwrap();

        // when (操作):
        let departure = manager.remove_player(&alice).await.unwrap();

        // then (期待する結果):
        assert!(departure.abandoned());
        assert!(departure.reclaimed);
        assert_eq!(departure.room.id, room.id);
        assert_eq!(departure.room.players, vec![bob]);
        assert_eq!(departure.room.status, RoomStatus::Finished);
        assert_eq!(manager.get_room(&room.id).await, None);
        assert_eq!(manager.room_of(bob.user_id).await, None);
        check(&manager).await;

        // 解放されたプレイヤーは再びマッチできる
        assert!(manager.match_room(bob).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_player_is_idempotent_and_checks_connection() {
        // テスト項目: ルームに居ない・別接続のプレイヤーの退出は何もしない
        // given (前提条件):
        let manager = manager(2);
        let alice = player(1001);
        let stale = Player::new(alice.user_id, ConnectionId::generate());
        manager.match_room(alice).await.unwrap();

        // when (操作):
        let stale_result = manager.remove_player(&stale).await;
        let first = manager.remove_player(&alice).await;
        let second = manager.remove_player(&alice).await;

        // then (期待する結果):
        assert_eq!(stale_result, None);
        assert!(first.is_some());
        assert_eq!(second, None);
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_finish_room() {
        // テスト項目: Playing ルームを終了すると回収され、メンバーが解放される
        // given (前提条件):
        let manager = manager(2);
        let alice = player(1);
        manager.match_room(alice).await.unwrap();
        let room = manager.match_room(player(2)).await.unwrap();
        let idle = manager.create_room(player(9)).await.unwrap();
        assert_eq!(room.status, RoomStatus::Playing);

        // when (操作):
        let finished = manager.finish_room(&room.id).await.unwrap();
        let not_playing = manager.finish_room(&idle.id).await;

        // then (期待する結果):
        assert_eq!(finished.status, RoomStatus::Finished);
        assert_eq!(manager.get_room(&room.id).await, None);
        assert_eq!(manager.room_of(alice.user_id).await, None);
        assert_eq!(
            not_playing,
            Err(RoomError::RoomNotPlaying(idle.id.as_str().to_string()))
        );
        check(&manager).await;
    }

    #[tokio::test]
    async fn test_concurrent_matches_never_share_a_seat() {
        // テスト項目: 並行したマッチでも席の二重割り当てが起きず、逐次実行と同じ結果になる
        // given (前提条件):
        for capacity in [2usize, 3, 5] {
            let manager = Arc::new(manager(capacity));
            let players = 101;

            // when (操作):
            let handles: Vec<_> = (1..=players)
                .map(|uid| {
                    let manager = manager.clone();
                    tokio::spawn(async move { manager.match_room(player(uid)).await })
                })
                .collect();
            for handle in handles {
                assert!(handle.await.unwrap().is_ok());
            }

            // then (期待する結果):
            check(&manager).await;
            let rooms = manager.list_rooms().await;
            let seated: usize = rooms.iter().map(|r| r.players.len()).sum();
            assert_eq!(seated, players as usize);

            let playing = rooms
                .iter()
                .filter(|r| r.status == RoomStatus::Playing)
                .count();
            let idle: Vec<_> = rooms
                .iter()
                .filter(|r| r.status == RoomStatus::Idle)
                .collect();
            assert_eq!(playing, players as usize / capacity);
            assert_eq!(idle.len(), usize::from(players as usize % capacity != 0));
            if let Some(room) = idle.first() {
                assert_eq!(room.players.len(), players as usize % capacity);
            }
        }
    }
}
