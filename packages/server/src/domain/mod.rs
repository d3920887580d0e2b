//! Domain layer: value objects, entities, errors and the traits the use cases
//! depend on. Implementations live in the infrastructure layer.

pub mod auth;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use auth::{NonEmptyTokenVerifier, TokenVerifier};
pub use entity::{Player, Room, RoomDeparture, RoomStatus};
pub use error::{MessagePushError, RoomError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{PlayerRegistry, RoomManager};
pub use value_object::{ConnectionId, RoomId, RoomIdFactory, Timestamp, UserId};

#[cfg(test)]
pub use auth::MockTokenVerifier;
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
