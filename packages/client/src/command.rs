//! Parsing of the lines typed at the prompt.
//!
//! | input | sent envelope |
//! |---|---|
//! | `match` | `{"type":"match_room"}` |
//! | `create` | `{"type":"create_room"}` |
//! | `join <room_id>` | `{"type":"join_room","room_id":...}` |
//! | `sync <json>` | `{"type":"sync","data":<json>}` |
//! | `auth <token>` | `{"type":"auth","token":...}` |
//! | `leave` | `{"type":"leave"}` |
//! | `{...}` | sent as is |

use gamehall_server::infrastructure::dto::websocket::{Envelope, MessageType};

use crate::ClientError;

pub const HELP: &str = "commands: match | create | join <room_id> | sync <json> | auth <token> | leave | help | {raw json}";

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Envelope),
    Help,
}

pub fn parse_command(line: &str) -> Result<Command, ClientError> {
    let line = line.trim();
    if line.starts_with('{') {
        let envelope = serde_json::from_str::<Envelope>(line)
            .map_err(|e| ClientError::InvalidCommand(format!("bad envelope: {e}")))?;
        return Ok(Command::Send(envelope));
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let envelope = match verb {
        "help" | "?" => return Ok(Command::Help),
        "match" => Envelope::new(MessageType::MatchRoom),
        "create" => Envelope::new(MessageType::CreateRoom),
        "leave" => Envelope::new(MessageType::Leave),
        "join" => {
            if rest.is_empty() {
                return Err(ClientError::InvalidCommand("usage: join <room_id>".to_string()));
            }
            let mut envelope = Envelope::new(MessageType::JoinRoom);
            envelope.room_id = Some(rest.to_string());
            envelope
        }
        "auth" => {
            let mut envelope = Envelope::new(MessageType::Auth);
            envelope.token = rest.to_string();
            envelope
        }
        "sync" => {
            let data = serde_json::from_str(rest)
                .map_err(|e| ClientError::InvalidCommand(format!("sync data must be JSON: {e}")))?;
            Envelope::new(MessageType::Sync).with_data(data)
        }
        other => return Err(ClientError::InvalidCommand(format!("unknown command '{other}'"))),
    };
    Ok(Command::Send(envelope))
}
