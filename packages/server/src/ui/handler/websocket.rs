//! WebSocket upgrade handler.
//!
//! `GET {base_path}/{game}?uid={uid}` is validated in this order before any
//! session state exists:
//!
//! 1. `game` is enabled → otherwise 404
//! 2. `uid` is a non-zero unsigned integer → otherwise 403
//! 3. the request is a WebSocket upgrade → otherwise 400
//! 4. the `Origin` hostname is allowed → otherwise 403

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        rejection::QueryRejection,
        ws::{WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::{HeaderMap, StatusCode, Uri, header::ORIGIN},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    domain::{ConnectionId, Player, UserId},
    ui::{session::run_session, state::AppState},
};

/// Query parameters of the upgrade request
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub uid: Option<String>,
}

/// Hostname of an `Origin` header value such as `http://localhost:8080`.
///
/// IPv6 literals come back without brackets (`http://[::1]:8080` → `::1`).
fn origin_hostname(headers: &HeaderMap) -> Option<String> {
    let origin = headers.get(ORIGIN)?.to_str().ok()?;
    let uri: Uri = origin.parse().ok()?;
    let host = uri.host()?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    Some(host.to_string())
}

pub async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(game): Path<String>,
    query: Result<Query<ConnectQuery>, QueryRejection>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !state.config.is_game_enabled(&game) {
        tracing::warn!(game = %game, "connection to unknown or disabled game rejected");
        return StatusCode::NOT_FOUND.into_response();
    }

    let uid = query.ok().and_then(|Query(q)| q.uid);
    let user_id = match uid.as_deref().map(UserId::parse) {
        Some(Ok(user_id)) => user_id,
        Some(Err(e)) => {
            tracing::warn!(game = %game, "invalid uid: {}", e);
            return StatusCode::FORBIDDEN.into_response();
        }
        None => {
            tracing::warn!(game = %game, "missing uid");
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!(%user_id, "not a websocket upgrade: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let hostname = origin_hostname(&headers);
    if !state.config.is_origin_allowed(hostname.as_deref()) {
        tracing::warn!(%user_id, origin = ?hostname, "origin not allowed");
        return StatusCode::FORBIDDEN.into_response();
    }

    let player = Player::new(user_id, ConnectionId::generate());
    tracing::info!(%user_id, connection = %player.connection, game = %game, "upgrading connection");
    ws.on_failed_upgrade(move |e| {
        tracing::warn!(%user_id, "websocket upgrade failed: {}", e);
    })
    .on_upgrade(move |socket| run_session(socket, state, player))
}
