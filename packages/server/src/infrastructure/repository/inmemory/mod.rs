//! In-process state stores. State lives for the lifetime of the server process.

mod player;
mod room;

pub use player::InMemoryPlayerRegistry;
pub use room::InMemoryRoomManager;
