//! InMemory PlayerRegistry 実装
//!
//! UserId と ConnectionId の 2 つの HashMap を 1 つの RwLock で保護します。
//! 検索は read ロック、join/leave は write ロックで行うため、
//! 2 つの索引が食い違った状態が外部から観測されることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConnectionId, Player, PlayerRegistry, UserId};

#[derive(Debug, Default)]
struct PlayerIndex {
    by_user: HashMap<UserId, Player>,
    by_connection: HashMap<ConnectionId, Player>,
}

/// インメモリ PlayerRegistry 実装
#[derive(Debug, Default)]
pub struct InMemoryPlayerRegistry {
    index: RwLock<PlayerIndex>,
}

impl InMemoryPlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRegistry for InMemoryPlayerRegistry {
    async fn join(&self, player: Player) -> Option<Player> {
        let mut index = self.index.write().await;

        // 接続が別ユーザーに紐付いていた場合、そのユーザーの登録を外す
        if let Some(previous) = index.by_connection.insert(player.connection, player)
            && previous.user_id != player.user_id
            && index
                .by_user
                .get(&previous.user_id)
                .is_some_and(|p| p.connection == player.connection)
        {
            index.by_user.remove(&previous.user_id);
        }

        let replaced = index.by_user.insert(player.user_id, player);
        if let Some(old) = replaced
            && old.connection != player.connection
        {
            index.by_connection.remove(&old.connection);
        }

        tracing::debug!(
            user_id = %player.user_id,
            connection = %player.connection,
            replaced = replaced.is_some_and(|old| old != player),
            "player joined registry"
        );

        replaced.filter(|old| *old != player)
    }

    async fn leave(&self, player: &Player) -> bool {
        let mut index = self.index.write().await;
        match index.by_user.get(&player.user_id) {
            Some(current) if current.connection == player.connection => {
                index.by_user.remove(&player.user_id);
                index.by_connection.remove(&player.connection);
                tracing::debug!(
                    user_id = %player.user_id,
                    connection = %player.connection,
                    "player left registry"
                );
                true
            }
            _ => false,
        }
    }

    async fn lookup(&self, user_id: UserId) -> Option<Player> {
        self.index.read().await.by_user.get(&user_id).copied()
    }

    async fn count(&self) -> usize {
        self.index.read().await.by_user.len()
    }
}
