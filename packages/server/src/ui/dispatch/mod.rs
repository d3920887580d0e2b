//! Message dispatch.
//!
//! Each decoded envelope is routed through a table indexed by [`MessageType`].
//! Tags without an entry are answered with an `error` envelope (code 3) and
//! leave every piece of state untouched. A panic inside a handler is contained
//! here and turned into an `error` envelope (code 10) plus a session close.

mod handlers;

use std::{collections::HashMap, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::sync::mpsc::WeakUnboundedSender;

use crate::{
    domain::{Player, PusherChannel},
    infrastructure::dto::websocket::{Envelope, MessageType, ResponseCode},
};

pub use handlers::{
    AuthHandler, CreateRoomHandler, JoinRoomHandler, LeaveHandler, MatchRoomHandler, SyncHandler,
};

/// What the session does after a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading.
    Continue,
    /// End the session.
    Close,
}

/// Per-connection state visible to handlers.
pub struct SessionContext {
    player: Player,
    authenticated: bool,
    outbound: WeakUnboundedSender<String>,
}

impl SessionContext {
    /// The context keeps only a weak handle on the outbound channel, so that
    /// releasing the connection in the message pusher still ends the writer.
    pub fn new(player: Player, outbound: &PusherChannel) -> Self {
        Self {
            player,
            authenticated: false,
            outbound: outbound.downgrade(),
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn mark_authenticated(&mut self) {
        self.authenticated = true;
    }

    /// Queue a reply on this connection. `false` once the connection is released.
    pub fn reply(&self, envelope: &Envelope) -> bool {
        match self.outbound.upgrade() {
            Some(tx) => tx.send(envelope.to_json()).is_ok(),
            None => false,
        }
    }
}

/// Handler for one message type.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, session: &mut SessionContext, envelope: Envelope) -> Outcome;
}

/// Capability-indexed routing table.
pub struct Dispatcher {
    handlers: HashMap<MessageType, Arc<dyn MessageHandler>>,
    require_auth: bool,
}

impl Dispatcher {
    /// An empty table. With `require_auth`, room operations are refused until
    /// the session authenticated.
    pub fn new(require_auth: bool) -> Self {
        Self {
            handlers: HashMap::new(),
            require_auth,
        }
    }

    /// Route `message_type` to `handler`. Server-only types are never routed.
    pub fn register(mut self, message_type: MessageType, handler: Arc<dyn MessageHandler>) -> Self {
        if message_type.is_server_only() {
            tracing::warn!(
                message_type = message_type.as_str(),
                "refusing to route a server-only message type"
            );
            return self;
        }
        self.handlers.insert(message_type, handler);
        self
    }

    /// Handle one inbound envelope.
    pub async fn dispatch(&self, session: &mut SessionContext, envelope: Envelope) -> Outcome {
        let user_id = session.player().user_id;

        let message_type = match envelope.message_type() {
            Some(t) if t.is_server_only() => {
                tracing::warn!(%user_id, message_type = t.as_str(), "client sent a server-only message");
                session.reply(&Envelope::error(ResponseCode::ServerOnlyType));
                return Outcome::Continue;
            }
            Some(t) => t,
            None => {
                tracing::warn!(%user_id, message_type = %envelope.r#type, "unknown message type");
                session.reply(&Envelope::error(ResponseCode::UnknownType));
                return Outcome::Continue;
            }
        };

        let Some(handler) = self.handlers.get(&message_type).cloned() else {
            tracing::warn!(%user_id, message_type = message_type.as_str(), "unhandled message type");
            session.reply(&Envelope::error(ResponseCode::UnknownType));
            return Outcome::Continue;
        };

        if self.require_auth && requires_auth(message_type) && !session.is_authenticated() {
            session.reply(&Envelope::new(message_type).with_code(ResponseCode::NoAuth));
            return Outcome::Continue;
        }

        tracing::debug!(%user_id, message_type = message_type.as_str(), "dispatching message");
        let handled = AssertUnwindSafe(handler.handle(session, envelope))
            .catch_unwind()
            .await;
        match handled {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(
                    %user_id,
                    message_type = message_type.as_str(),
                    "handler panicked, closing session"
                );
                session.reply(&Envelope::error(ResponseCode::InternalError));
                Outcome::Close
            }
        }
    }
}

fn requires_auth(message_type: MessageType) -> bool {
    matches!(
        message_type,
        MessageType::CreateRoom | MessageType::JoinRoom | MessageType::MatchRoom | MessageType::Sync
    )
}
