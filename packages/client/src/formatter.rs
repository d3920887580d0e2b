//! Message formatting utilities for client display.

use gamehall_server::infrastructure::dto::websocket::{Envelope, MessageType};
use gamehall_shared::time::millis_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Human readable meaning of a response code
    pub fn describe_code(code: i32) -> &'static str {
        match code {
            0 => "success",
            1 => "not authenticated",
            2 => "authentication failed",
            3 => "unknown message type",
            4 => "message type is server-only",
            5 => "already in a room",
            6 => "room not found",
            7 => "room is not joinable",
            8 => "not in a room",
            9 => "bad request",
            10 => "internal server error",
            _ => "unrecognized code",
        }
    }

    fn players(envelope: &Envelope) -> String {
        envelope
            .players
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn room(envelope: &Envelope) -> &str {
        envelope.room_id.as_deref().unwrap_or("-")
    }

    /// Format an envelope received from the server
    ///
    /// # Arguments
    ///
    /// * `envelope` - The decoded envelope
    /// * `received_at` - Unix timestamp when it was received (milliseconds)
    pub fn format_envelope(envelope: &Envelope, received_at: i64) -> String {
        let at = millis_to_rfc3339(received_at);
        if envelope.code != 0 {
            return format!(
                "\n! {} failed: {} (code {}) at {}\n",
                envelope.r#type,
                Self::describe_code(envelope.code),
                envelope.code,
                at
            );
        }

        match envelope.message_type() {
            Some(MessageType::MatchRoom | MessageType::CreateRoom | MessageType::JoinRoom) => {
                format!(
                    "\n* seated in room {} [{}] at {}\n",
                    Self::room(envelope),
                    Self::players(envelope),
                    at
                )
            }
            Some(MessageType::GameStart) => format!(
                "\n\n============================================================\n\
                 GAME START  room {}\n\
                 players: {}\n\
                 ============================================================\n",
                Self::room(envelope),
                Self::players(envelope)
            ),
            Some(MessageType::GameEnd) => format!(
                "\n\n============================================================\n\
                 GAME END  room {}\n\
                 remaining: {}\n\
                 ============================================================\n",
                Self::room(envelope),
                Self::players(envelope)
            ),
            Some(MessageType::Sync) => {
                let data = envelope
                    .data
                    .as_ref()
                    .map(|data| data.to_string())
                    .unwrap_or_else(|| "null".to_string());
                format!("\n@{}: {}\n", Self::players(envelope), data)
            }
            Some(MessageType::Auth) => format!("\n* authenticated at {}\n", at),
            Some(MessageType::Leave) => format!("\n* left at {}\n", at),
            Some(MessageType::Error) | None => Self::format_raw_message(&envelope.to_json()),
        }
    }

    /// Format a message that could not be decoded
    pub fn format_raw_message(text: &str) -> String {
        format!("\n[raw] {}\n", text)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n[binary] {} bytes\n", byte_count)
    }
}
