//! Entities: players and rooms.

use serde::Serialize;

use super::value_object::{ConnectionId, RoomId, Timestamp, UserId};

/// A connected player: the user and the connection it is playing through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Player {
    pub user_id: UserId,
    pub connection: ConnectionId,
}

impl Player {
    pub fn new(user_id: UserId, connection: ConnectionId) -> Self {
        Self {
            user_id,
            connection,
        }
    }
}

/// Room lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Waiting for players; eligible for matchmaking.
    Idle,
    /// Reached capacity; the game is being played.
    Playing,
    /// The game concluded or was abandoned. Finished rooms are reclaimed.
    Finished,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Idle => "idle",
            RoomStatus::Playing => "playing",
            RoomStatus::Finished => "finished",
        }
    }
}

/// A game room.
///
/// `players` is kept in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub players: Vec<Player>,
    pub status: RoomStatus,
    pub capacity: usize,
    pub created_at: Timestamp,
}

impl Room {
    /// Create an idle room seating `first` as its only player.
    pub fn new(id: RoomId, first: Player, capacity: usize, created_at: Timestamp) -> Self {
        Self {
            id,
            players: vec![first],
            status: RoomStatus::Idle,
            capacity,
            created_at,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.players.iter().any(|p| p.user_id == user_id)
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        self.players.iter().map(|p| p.user_id).collect()
    }

    /// Connections of every member except `exclude`.
    pub fn connections_except(&self, exclude: UserId) -> Vec<ConnectionId> {
        self.players
            .iter()
            .filter(|p| p.user_id != exclude)
            .map(|p| p.connection)
            .collect()
    }

    pub fn connections(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.connection).collect()
    }
}

/// What happened to a room when a player left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDeparture {
    /// Snapshot of the room after the player was removed.
    pub room: Room,
    /// The room is no longer tracked by the manager (emptied or finished).
    pub reclaimed: bool,
}

impl RoomDeparture {
    /// The departure ended a game in progress.
    pub fn abandoned(&self) -> bool {
        self.room.status == RoomStatus::Finished && !self.room.is_empty()
    }
}
