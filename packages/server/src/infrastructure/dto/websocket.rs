//! WebSocket message envelope.
//!
//! Every frame carries exactly one JSON object. Zero-valued fields are omitted:
//!
//! ```json
//! {"type": "match_room", "code": 0, "token": "...", "room_id": "...", "players": [1001], "data": {}}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::Room;

/// Message type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Auth,
    CreateRoom,
    JoinRoom,
    MatchRoom,
    Sync,
    Leave,
    /// Server to client only.
    GameStart,
    /// Server to client only.
    GameEnd,
    /// Server to client only.
    Error,
}

impl MessageType {
    pub const ALL: [MessageType; 9] = [
        MessageType::Auth,
        MessageType::CreateRoom,
        MessageType::JoinRoom,
        MessageType::MatchRoom,
        MessageType::Sync,
        MessageType::Leave,
        MessageType::GameStart,
        MessageType::GameEnd,
        MessageType::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Auth => "auth",
            MessageType::CreateRoom => "create_room",
            MessageType::JoinRoom => "join_room",
            MessageType::MatchRoom => "match_room",
            MessageType::Sync => "sync",
            MessageType::Leave => "leave",
            MessageType::GameStart => "game_start",
            MessageType::GameEnd => "game_end",
            MessageType::Error => "error",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Types only the server may send.
    pub fn is_server_only(&self) -> bool {
        matches!(
            self,
            MessageType::GameStart | MessageType::GameEnd | MessageType::Error
        )
    }
}

/// Status codes carried in `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResponseCode {
    Success = 0,
    NoAuth = 1,
    AuthFail = 2,
    UnknownType = 3,
    ServerOnlyType = 4,
    AlreadyInRoom = 5,
    RoomNotFound = 6,
    RoomNotJoinable = 7,
    NotInRoom = 8,
    BadRequest = 9,
    InternalError = 10,
}

impl ResponseCode {
    pub fn value(self) -> i32 {
        self as i32
    }
}

fn is_zero(code: &i32) -> bool {
    *code == 0
}

/// The envelope exchanged in both directions.
///
/// `type` is kept as a raw string so that unknown tags still decode and can be
/// answered with [`ResponseCode::UnknownType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn new(message_type: MessageType) -> Self {
        Self {
            r#type: message_type.as_str().to_string(),
            ..Self::default()
        }
    }

    /// An `error` envelope with the given code.
    pub fn error(code: ResponseCode) -> Self {
        Self::new(MessageType::Error).with_code(code)
    }

    pub fn with_code(mut self, code: ResponseCode) -> Self {
        self.code = code.value();
        self
    }

    /// Attach the room id and its members (in join order).
    pub fn with_room(mut self, room: &Room) -> Self {
        self.room_id = Some(room.id.as_str().to_string());
        self.players = Some(room.user_ids().into_iter().map(u64::from).collect());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The parsed type tag, `None` for unknown tags.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_tag(&self.r#type)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("failed to serialize envelope: {}", e);
            String::from("{}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, Player, RoomIdFactory, Timestamp, UserId};

    #[test]
    fn test_message_type_tags() {
        // テスト項目: 全てのメッセージ種別がタグと相互変換できる
        // given (前提条件):
        let types = MessageType::ALL;

        // when (操作) / then (期待する結果):
        for t in types {
            assert_eq!(MessageType::from_tag(t.as_str()), Some(t));
        }
        assert_eq!(MessageType::from_tag("bogus"), None);
        assert_eq!(MessageType::from_tag("MATCH_ROOM"), None);
    }

    #[test]
    fn test_server_only_types() {
        // テスト項目: game_start / game_end / error はサーバー専用
        // given (前提条件):

        // when (操作):
        let server_only: Vec<_> = MessageType::ALL
            .into_iter()
            .filter(MessageType::is_server_only)
            .collect();

        // then (期待する結果):
        assert_eq!(
            server_only,
            vec![
                MessageType::GameStart,
                MessageType::GameEnd,
                MessageType::Error
            ]
        );
    }

    #[test]
    fn test_zero_valued_fields_are_omitted() {
        // テスト項目: 0 値のフィールドはシリアライズ時に省略される
        // given (前提条件):
        let envelope = Envelope::new(MessageType::MatchRoom);

        // when (操作):
        let json = envelope.to_json();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"match_room"}"#);
    }

    #[test]
    fn test_decode_minimal_and_unknown_frames() {
        // テスト項目: 省略されたフィールドや未知の type を含むフレームもデコードできる
        // given (前提条件):
        let auth = r#"{"type":"auth","token":"abc"}"#;
        let bogus = r#"{"type":"bogus","extra":true}"#;
        let empty = r#"{}"#;

        // when (操作):
        let auth: Envelope = serde_json::from_str(auth).unwrap();
        let bogus: Envelope = serde_json::from_str(bogus).unwrap();
        let empty: Envelope = serde_json::from_str(empty).unwrap();

        // then (期待する結果):
        assert_eq!(auth.message_type(), Some(MessageType::Auth));
        assert_eq!(auth.token, "abc");
        assert_eq!(auth.code, 0);
        assert_eq!(bogus.message_type(), None);
        assert_eq!(bogus.r#type, "bogus");
        assert_eq!(empty.message_type(), None);
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        // テスト項目: JSON として不正なフレームや型の違うフィールドはエラーになる
        // given (前提条件):
        let frames = ["not json", r#"{"type":1}"#, r#"{"code":"x"}"#, r#""match_room""#];

        for frame in frames {
            // when (操作):
            let result = serde_json::from_str::<Envelope>(frame);

            // then (期待する結果):
            assert!(result.is_err(), "frame={frame}");
        }
    }

    #[test]
    fn test_with_room_lists_players_in_join_order() {
        // テスト項目: with_room はルーム ID と参加順のプレイヤー一覧を付与する
        // given (前提条件):
        let first = Player::new(UserId::new(1002).unwrap(), ConnectionId::generate());
        let second = Player::new(UserId::new(1001).unwrap(), ConnectionId::generate());
        let mut room = Room::new(RoomIdFactory::generate(), first, 2, Timestamp::new(0));
        room.players.push(second);

        // when (操作):
        let envelope = Envelope::new(MessageType::GameStart)
            .with_code(ResponseCode::Success)
            .with_room(&room);

        // then (期待する結果):
        assert_eq!(envelope.room_id.as_deref(), Some(room.id.as_str()));
        assert_eq!(envelope.players, Some(vec![1002, 1001]));
        let json: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
        assert_eq!(json["type"], "game_start");
        assert!(json.get("code").is_none());
        assert!(json.get("token").is_none());
    }

    #[test]
    fn test_error_envelope_carries_code() {
        // テスト項目: error エンベロープはコードを持つ
        // given (前提条件):
        let envelope = Envelope::error(ResponseCode::UnknownType);

        // when (操作):
        let json = envelope.to_json();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"error","code":3}"#);
    }
}
