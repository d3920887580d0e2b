//! GameHall: real-time multiplayer session server.
//!
//! Clients connect over WebSocket with a user id, get registered in the player
//! registry, and are matched into rooms where game messages are relayed.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
