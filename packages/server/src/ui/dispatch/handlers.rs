//! Handlers of the client-to-server message types.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{Room, RoomError},
    infrastructure::dto::websocket::{Envelope, MessageType, ResponseCode},
    usecase::{
        AuthUseCase, CreateRoomUseCase, JoinRoomUseCase, MatchRoomUseCase, RoomAssignment,
        RoomRequestError, SyncUseCase,
    },
};

use super::{MessageHandler, Outcome, SessionContext};

fn room_error_code(error: &RoomRequestError) -> ResponseCode {
    match error {
        RoomRequestError::Room(RoomError::AlreadyInRoom(..)) => ResponseCode::AlreadyInRoom,
        RoomRequestError::Room(RoomError::RoomNotFound(_)) => ResponseCode::RoomNotFound,
        RoomRequestError::Room(RoomError::RoomNotJoinable(_) | RoomError::RoomNotPlaying(_)) => {
            ResponseCode::RoomNotJoinable
        }
        RoomRequestError::BadRequest(_) => ResponseCode::BadRequest,
    }
}

fn game_start(room: &Room) -> String {
    Envelope::new(MessageType::GameStart).with_room(room).to_json()
}

/// Reply to a seating request; returns the room when it just filled up.
fn reply_assignment(
    session: &SessionContext,
    message_type: MessageType,
    result: Result<RoomAssignment, RoomRequestError>,
) -> Option<Room> {
    match result {
        Ok(assignment) => {
            session.reply(&Envelope::new(message_type).with_room(&assignment.room));
            assignment.started.then_some(assignment.room)
        }
        Err(e) => {
            tracing::info!(
                user_id = %session.player().user_id,
                message_type = message_type.as_str(),
                "room request refused: {}",
                e
            );
            session.reply(&Envelope::new(message_type).with_code(room_error_code(&e)));
            None
        }
    }
}

/// `auth`
pub struct AuthHandler {
    usecase: Arc<AuthUseCase>,
}

impl AuthHandler {
    pub fn new(usecase: Arc<AuthUseCase>) -> Self {
        Self { usecase }
    }
}

#[async_trait]
impl MessageHandler for AuthHandler {
    async fn handle(&self, session: &mut SessionContext, envelope: Envelope) -> Outcome {
        let code = if self
            .usecase
            .execute(session.player().user_id, &envelope.token)
        {
            session.mark_authenticated();
            ResponseCode::Success
        } else {
            ResponseCode::AuthFail
        };
        session.reply(&Envelope::new(MessageType::Auth).with_code(code));
        Outcome::Continue
    }
}

/// `create_room`
pub struct CreateRoomHandler {
    usecase: Arc<CreateRoomUseCase>,
}

impl CreateRoomHandler {
    pub fn new(usecase: Arc<CreateRoomUseCase>) -> Self {
        Self { usecase }
    }
}

#[async_trait]
impl MessageHandler for CreateRoomHandler {
    async fn handle(&self, session: &mut SessionContext, _envelope: Envelope) -> Outcome {
        let result = self
            .usecase
            .execute(session.player())
            .await
            .map(RoomAssignment::from);
        reply_assignment(session, MessageType::CreateRoom, result);
        Outcome::Continue
    }
}

/// `join_room`
pub struct JoinRoomHandler {
    usecase: Arc<JoinRoomUseCase>,
}

impl JoinRoomHandler {
    pub fn new(usecase: Arc<JoinRoomUseCase>) -> Self {
        Self { usecase }
    }
}

#[async_trait]
impl MessageHandler for JoinRoomHandler {
    async fn handle(&self, session: &mut SessionContext, envelope: Envelope) -> Outcome {
        let result = self
            .usecase
            .execute(session.player(), envelope.room_id.as_deref())
            .await;
        if let Some(room) = reply_assignment(session, MessageType::JoinRoom, result)
            && let Err(e) = self.usecase.start_game(&room, &game_start(&room)).await
        {
            tracing::warn!(room_id = %room.id, "failed to push game_start: {}", e);
        }
        Outcome::Continue
    }
}

/// `match_room`
pub struct MatchRoomHandler {
    usecase: Arc<MatchRoomUseCase>,
}

impl MatchRoomHandler {
    pub fn new(usecase: Arc<MatchRoomUseCase>) -> Self {
        Self { usecase }
    }
}

#[async_trait]
impl MessageHandler for MatchRoomHandler {
    async fn handle(&self, session: &mut SessionContext, _envelope: Envelope) -> Outcome {
        let result = self.usecase.execute(session.player()).await;
        if let Some(room) = reply_assignment(session, MessageType::MatchRoom, result) {
            tracing::info!(room_id = %room.id, players = ?room.user_ids(), "game started");
            if let Err(e) = self.usecase.start_game(&room, &game_start(&room)).await {
                tracing::warn!(room_id = %room.id, "failed to push game_start: {}", e);
            }
        }
        Outcome::Continue
    }
}

/// `sync`: relays `data` to the other members of the sender's room.
pub struct SyncHandler {
    usecase: Arc<SyncUseCase>,
}

impl SyncHandler {
    pub fn new(usecase: Arc<SyncUseCase>) -> Self {
        Self { usecase }
    }
}

#[async_trait]
impl MessageHandler for SyncHandler {
    async fn handle(&self, session: &mut SessionContext, envelope: Envelope) -> Outcome {
        let sender = session.player();
        let Some(data) = envelope.data else {
            session.reply(&Envelope::new(MessageType::Sync).with_code(ResponseCode::BadRequest));
            return Outcome::Continue;
        };

        let room = match self.usecase.execute(sender).await {
            Ok(room) => room,
            Err(e) => {
                tracing::debug!(user_id = %sender.user_id, "sync refused: {}", e);
                session.reply(&Envelope::new(MessageType::Sync).with_code(ResponseCode::NotInRoom));
                return Outcome::Continue;
            }
        };

        let mut relay = Envelope::new(MessageType::Sync).with_data(data);
        relay.room_id = Some(room.id.as_str().to_string());
        relay.players = Some(vec![sender.user_id.value()]);
        if let Err(e) = self.usecase.relay(&room, &sender, &relay.to_json()).await {
            tracing::warn!(room_id = %room.id, "failed to relay sync: {}", e);
        }
        Outcome::Continue
    }
}

/// `leave`: acknowledges and ends the session.
pub struct LeaveHandler;

#[async_trait]
impl MessageHandler for LeaveHandler {
    async fn handle(&self, session: &mut SessionContext, _envelope: Envelope) -> Outcome {
        tracing::info!(user_id = %session.player().user_id, "player left");
        session.reply(&Envelope::new(MessageType::Leave));
        Outcome::Close
    }
}
