//! Utilities shared by the GameHall server and client binaries.

pub mod logger;
pub mod time;
