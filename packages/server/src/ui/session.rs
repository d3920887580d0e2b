//! Per-connection session loop.
//!
//! `Connecting → Joined → Reading → Closed`. The session registers the player,
//! reads one envelope at a time and hands it to the dispatcher, and runs the
//! disconnect use case exactly once when it ends, whatever the reason.

use std::{sync::Arc, time::Duration};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use crate::{
    domain::Player,
    infrastructure::dto::websocket::{Envelope, MessageType},
    usecase::DisconnectOutcome,
};

use super::{
    dispatch::{Outcome, SessionContext},
    state::AppState,
};

/// How long the writer may take to flush queued messages after the session ended.
const WRITER_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    /// The peer closed the connection or the stream ended.
    PeerClosed,
    /// The stream yielded an error.
    ReadFailed,
    /// A frame could not be decoded into an envelope.
    DecodeFailed,
    /// A handler asked to close (`leave`, contained panic).
    Requested,
    /// The writer stopped: the connection was superseded or a write failed.
    WriterEnded,
    /// Nothing was received within the idle timeout.
    IdleTimeout,
}

enum Frame {
    Envelope(Envelope),
    Ignored,
    Closed(CloseReason),
}

/// Drive one upgraded connection until it closes.
pub async fn run_session(socket: WebSocket, state: Arc<AppState>, player: Player) {
    let (sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = SessionContext::new(player, &tx);
    let guard = CleanupGuard::new(state.clone(), player);

    // Joined
    if let Some(superseded) = state.connect_player.execute(player, tx).await {
        notify_abandoned(&state, &superseded).await;
    }
    tracing::info!(user_id = %player.user_id, connection = %player.connection, "session joined");

    let mut writer = pusher_loop(rx, sink);
    let idle_timeout = state.config.idle_timeout();

    // Reading
    let reason = loop {
        let frame = tokio::select! {
            _ = &mut writer => break CloseReason::WriterEnded,
            frame = next_frame(&mut stream, idle_timeout) => frame,
        };
        match frame {
            Frame::Envelope(envelope) => {
                if state.dispatcher.dispatch(&mut session, envelope).await == Outcome::Close {
                    break CloseReason::Requested;
                }
            }
            Frame::Ignored => {}
            Frame::Closed(reason) => break reason,
        }
    };

    // Closed
    tracing::info!(
        user_id = %player.user_id,
        connection = %player.connection,
        reason = ?reason,
        "session closing"
    );
    guard.run().await;

    if reason != CloseReason::WriterEnded
        && tokio::time::timeout(WRITER_FLUSH_TIMEOUT, &mut writer)
            .await
            .is_err()
    {
        tracing::warn!(connection = %player.connection, "writer did not finish, aborting");
        writer.abort();
    }
}

async fn next_frame(stream: &mut SplitStream<WebSocket>, idle_timeout: Option<Duration>) -> Frame {
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
            Ok(next) => next,
            Err(_) => return Frame::Closed(CloseReason::IdleTimeout),
        },
        None => stream.next().await,
    };

    match next {
        None | Some(Ok(Message::Close(_))) => Frame::Closed(CloseReason::PeerClosed),
        Some(Err(e)) => {
            tracing::debug!("websocket read failed: {}", e);
            Frame::Closed(CloseReason::ReadFailed)
        }
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<Envelope>(text.as_str()) {
            Ok(envelope) => Frame::Envelope(envelope),
            Err(e) => {
                tracing::warn!("failed to decode envelope: {}", e);
                Frame::Closed(CloseReason::DecodeFailed)
            }
        },
        Some(Ok(Message::Binary(_))) => {
            tracing::warn!("binary frames are not supported");
            Frame::Closed(CloseReason::DecodeFailed)
        }
        // ping/pong are answered by the transport
        Some(Ok(_)) => Frame::Ignored,
    }
}

/// Spawns the single writer of a connection.
///
/// Drains the outbound channel into the socket until every sender is gone,
/// then sends a close frame.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sink: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
    })
}

async fn cleanup(state: &AppState, player: Player) {
    let outcome = state.disconnect_player.execute(player).await;
    notify_abandoned(state, &outcome).await;
    tracing::info!(
        user_id = %player.user_id,
        connection = %player.connection,
        deregistered = outcome.deregistered,
        "session closed"
    );
}

async fn notify_abandoned(state: &AppState, outcome: &DisconnectOutcome) {
    let Some(room) = outcome.abandoned_room() else {
        return;
    };
    tracing::info!(
        room_id = %room.id,
        left = %outcome.player.user_id,
        "game abandoned, notifying remaining players"
    );
    let message = Envelope::new(MessageType::GameEnd).with_room(room).to_json();
    if let Err(e) = state
        .disconnect_player
        .notify_abandoned(outcome, &message)
        .await
    {
        tracing::warn!(room_id = %room.id, "failed to push game_end: {}", e);
    }
}

/// Runs the cleanup path once: explicitly at the end of the session, or from
/// `Drop` when the session task is cancelled before reaching it.
struct CleanupGuard {
    state: Option<Arc<AppState>>,
    player: Player,
}

impl CleanupGuard {
    fn new(state: Arc<AppState>, player: Player) -> Self {
        Self {
            state: Some(state),
            player,
        }
    }

    async fn run(mut self) {
        if let Some(state) = self.state.take() {
            cleanup(&state, self.player).await;
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        let player = self.player;
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { cleanup(&state, player).await });
            }
            Err(_) => {
                tracing::error!(
                    user_id = %player.user_id,
                    "session dropped outside the runtime, cleanup skipped"
                );
            }
        }
    }
}
