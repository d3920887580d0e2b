//! Repository implementations.

pub mod inmemory;

pub use inmemory::{InMemoryPlayerRegistry, InMemoryRoomManager};
