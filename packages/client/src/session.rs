//! WebSocket client session management.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures_util::{SinkExt, StreamExt};
use gamehall_server::infrastructure::dto::websocket::{Envelope, MessageType};
use gamehall_shared::time::now_millis;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message, client::IntoClientRequest, http::HeaderValue},
};

use crate::{
    ClientError,
    command::{Command, HELP, parse_command},
    formatter::MessageFormatter,
    ui::{PROMPT, redisplay_prompt},
};

/// Open the upgrade request, mapping an HTTP refusal to [`ClientError::Rejected`].
async fn connect(
    url: &str,
    origin: Option<&str>,
) -> Result<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    ClientError,
> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    if let Some(origin) = origin {
        let value = HeaderValue::from_str(origin)
            .map_err(|e| ClientError::ConnectionError(format!("invalid origin: {e}")))?;
        request.headers_mut().insert("Origin", value);
    }

    match connect_async(request).await {
        Ok((stream, _)) => Ok(stream),
        Err(tungstenite::Error::Http(response)) => {
            Err(ClientError::Rejected(response.status().as_u16()))
        }
        Err(e) => Err(ClientError::ConnectionError(e.to_string())),
    }
}

/// Run one WebSocket client session.
///
/// Returns `Ok(())` when the user quits or leaves, and an error when the
/// connection is lost.
pub async fn run_client_session(url: &str, origin: Option<&str>) -> Result<(), ClientError> {
    let ws_stream = connect(url, origin).await?;
    tracing::info!("Connected to {}", url);
    println!("\n{}\nPress Ctrl+C to exit.\n", HELP);

    let (mut write, mut read) = ws_stream.split();
    let leaving = Arc::new(AtomicBool::new(false));

    // Spawn a task to handle incoming messages
    let leaving_for_read = leaving.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<Envelope>(text.as_str()) {
                        Ok(envelope) => MessageFormatter::format_envelope(&envelope, now_millis()),
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt();
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt();
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        // a close after `leave` is the expected end of the session
        !leaving_for_read.load(Ordering::SeqCst)
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to send parsed commands to the server
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let envelope = match parse_command(&line) {
                Ok(Command::Send(envelope)) => envelope,
                Ok(Command::Help) => {
                    println!("{}", HELP);
                    continue;
                }
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            if envelope.message_type() == Some(MessageType::Leave) {
                leaving.store(true, Ordering::SeqCst);
            }
            if let Err(e) = write.send(Message::Text(envelope.to_json().into())).await {
                tracing::warn!("Failed to send message: {}", e);
                return true;
            }
        }
        // input closed (Ctrl+C / Ctrl+D)
        let _ = write.close().await;
        false
    });

    // If any one of the tasks completes, abort the other
    let connection_lost = tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            read_result.unwrap_or(true)
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result.unwrap_or(true)
        }
    };

    if connection_lost {
        return Err(ClientError::ConnectionError("Connection lost".to_string()));
    }
    Ok(())
}
