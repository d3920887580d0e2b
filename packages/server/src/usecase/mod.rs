//! UseCase layer.
//!
//! Each use case owns the trait objects it needs (`PlayerRegistry`,
//! `RoomManager`, `MessagePusher`) and never holds two of their locks at once.
//! Message bodies are rendered by the UI layer and handed in as strings.

mod auth;
mod connect_player;
mod disconnect_player;
mod error;
mod query;
mod room;
mod sync;

pub use auth::AuthUseCase;
pub use connect_player::ConnectPlayerUseCase;
pub use disconnect_player::{DisconnectOutcome, DisconnectPlayerUseCase};
pub use error::{GetPlayerStatusError, GetRoomDetailError, RoomRequestError, SyncError};
pub use query::{GetPlayerStatusUseCase, GetRoomDetailUseCase, GetRoomsUseCase, PlayerStatus};
pub use room::{CreateRoomUseCase, JoinRoomUseCase, MatchRoomUseCase, RoomAssignment};
pub use sync::SyncUseCase;
