//! Shared application state.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, PlayerRegistry, RoomManager, TokenVerifier},
    infrastructure::dto::websocket::MessageType,
    usecase::{
        AuthUseCase, ConnectPlayerUseCase, CreateRoomUseCase, DisconnectPlayerUseCase,
        GetPlayerStatusUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        MatchRoomUseCase, SyncUseCase,
    },
};

use super::dispatch::{
    AuthHandler, CreateRoomHandler, Dispatcher, JoinRoomHandler, LeaveHandler, MatchRoomHandler,
    SyncHandler,
};

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    /// ConnectPlayerUseCase（プレイヤー接続のユースケース）
    pub connect_player: Arc<ConnectPlayerUseCase>,
    /// DisconnectPlayerUseCase（プレイヤー切断のユースケース）
    pub disconnect_player: Arc<DisconnectPlayerUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail: Arc<GetRoomDetailUseCase>,
    /// GetPlayerStatusUseCase（プレイヤー状態取得のユースケース）
    pub get_player_status: Arc<GetPlayerStatusUseCase>,
    /// メッセージ種別ごとのルーティング表
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Wire the use cases and the dispatch table on top of the given
    /// registry, room manager, message pusher and token verifier.
    pub fn new(
        config: ServerConfig,
        registry: Arc<dyn PlayerRegistry>,
        room_manager: Arc<dyn RoomManager>,
        message_pusher: Arc<dyn MessagePusher>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let connect_player = Arc::new(ConnectPlayerUseCase::new(
            registry.clone(),
            room_manager.clone(),
            message_pusher.clone(),
        ));
        let disconnect_player = Arc::new(DisconnectPlayerUseCase::new(
            registry.clone(),
            room_manager.clone(),
            message_pusher.clone(),
        ));
        let match_room = Arc::new(MatchRoomUseCase::new(
            room_manager.clone(),
            message_pusher.clone(),
        ));
        let join_room = Arc::new(JoinRoomUseCase::new(
            room_manager.clone(),
            message_pusher.clone(),
        ));
        let create_room = Arc::new(CreateRoomUseCase::new(room_manager.clone()));
        let sync = Arc::new(SyncUseCase::new(room_manager.clone(), message_pusher));
        let auth = Arc::new(AuthUseCase::new(verifier));

        let dispatcher = Dispatcher::new(config.require_auth)
            .register(MessageType::Auth, Arc::new(AuthHandler::new(auth)))
            .register(
                MessageType::CreateRoom,
                Arc::new(CreateRoomHandler::new(create_room)),
            )
            .register(MessageType::JoinRoom, Arc::new(JoinRoomHandler::new(join_room)))
            .register(
                MessageType::MatchRoom,
                Arc::new(MatchRoomHandler::new(match_room)),
            )
            .register(MessageType::Sync, Arc::new(SyncHandler::new(sync)))
            .register(MessageType::Leave, Arc::new(LeaveHandler));

        Self {
            connect_player,
            disconnect_player,
            get_rooms: Arc::new(GetRoomsUseCase::new(room_manager.clone())),
            get_room_detail: Arc::new(GetRoomDetailUseCase::new(room_manager.clone())),
            get_player_status: Arc::new(GetPlayerStatusUseCase::new(registry, room_manager)),
            dispatcher,
            config,
        }
    }
}
