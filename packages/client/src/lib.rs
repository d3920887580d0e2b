//! Interactive CLI client for the GameHall session server.

pub mod command;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;

/// Upgrade URL for `game` as user `uid`, e.g. `ws://127.0.0.1:3000/game/tic-tac-toe?uid=1001`.
pub fn connect_url(base: &str, game: &str, uid: u64) -> String {
    format!("{}/{}?uid={}", base.trim_end_matches('/'), game, uid)
}
