//! Infrastructure layer: implementations of the domain traits and the wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
