//! Server execution logic.

use std::sync::Arc;

use axum::{Router, body::Body, http::Request, routing::get};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use super::{
    handler::{get_player_status, get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Build the router: the upgrade route under `base_path` and the read-only HTTP API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // WebSocket エンドポイント
        .route(&state.config.upgrade_route(), get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/players/{uid}", get(get_player_status))
        .with_state(state);
    with_http_layers(router)
}

/// Request id, request tracing and panic recovery around every route.
///
/// A request without `x-request-id` gets a fresh UUID; the id is echoed on the
/// response and recorded on the request span. A panicking handler answers 500.
fn with_http_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id,
    )
}

/// GameHall session server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(Arc::new(app_state));
/// server.run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Bind to the configured address and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.state.config.bind_addr();
        let upgrade_route = self.state.config.upgrade_route();
        let app = build_router(self.state);

        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        tracing::info!("GameHall server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}{}?uid=<uid>", bind_addr, upgrade_route);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn panicking_handler() -> &'static str {
        panic!("handler failure")
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_request_id_is_generated_and_propagated() {
        // テスト項目: x-request-id が無い要求には UUID が振られ、ある要求はそのまま返される
        // given (前提条件):
        let base = serve(with_http_layers(
            Router::new().route("/ok", get(|| async { "ok" })),
        ))
        .await;
        let client = reqwest::Client::new();

        // when (操作):
        let generated = client.get(format!("{base}/ok")).send().await.unwrap();
        let supplied = client
            .get(format!("{base}/ok"))
            .header("x-request-id", "trace-1001")
            .send()
            .await
            .unwrap();

        // then (期待する結果):
        let id = generated.headers()["x-request-id"].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert_eq!(supplied.headers()["x-request-id"], "trace-1001");
    }

    #[tokio::test]
    async fn test_handler_panic_answers_500_and_server_keeps_serving() {
        // テスト項目: ハンドラーが panic しても 500 を返し、サーバーは次の要求を処理できる
        // given (前提条件):
        let base = serve(with_http_layers(
            Router::new()
                .route("/boom", get(panicking_handler))
                .route("/ok", get(|| async { "ok" })),
        ))
        .await;

        // when (操作):
        let boom = reqwest::get(format!("{base}/boom")).await.unwrap();
        let ok = reqwest::get(format!("{base}/ok")).await.unwrap();

        // then (期待する結果):
        assert_eq!(boom.status().as_u16(), 500);
        assert!(boom.headers().contains_key("x-request-id"));
        assert_eq!(ok.status().as_u16(), 200);
    }
}
