//! GameHall session server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin gamehall-server
//! cargo run --bin gamehall-server -- --config gamehall.toml --port 3000
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use gamehall_server::{
    config::{Environment, ServerConfig},
    domain::NonEmptyTokenVerifier,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryPlayerRegistry, InMemoryRoomManager},
    },
    ui::{AppState, Server},
};
use gamehall_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "gamehall-server", version)]
#[command(about = "Real-time multiplayer session server", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Host address to bind the server to (overrides the config file)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port number to bind the server to (overrides the config file)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Default log level (overrides the config file)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

fn load_config(args: Args) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = setup_logger(
        env!("CARGO_BIN_NAME"),
        &config.log_level,
        config.env == Environment::Prod,
        config.log_dir(),
    ) {
        eprintln!("failed to initialize logging: {}", e);
        std::process::exit(1);
    }
    tracing::info!(
        env = ?config.env,
        room_capacity = config.room_capacity,
        log_path = %config.log_path,
        games = ?config.games,
        "configuration loaded"
    );

    // Initialize dependencies in order:
    // 1. Registry / RoomManager
    // 2. MessagePusher
    // 3. AppState (use cases and dispatch table)
    // 4. Server
    let registry = Arc::new(InMemoryPlayerRegistry::new());
    let room_manager = Arc::new(InMemoryRoomManager::new(
        config.room_capacity,
        Arc::new(SystemClock),
    ));
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let state = Arc::new(AppState::new(
        config,
        registry,
        room_manager,
        message_pusher,
        Arc::new(NonEmptyTokenVerifier),
    ));

    if let Err(e) = Server::new(state).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
