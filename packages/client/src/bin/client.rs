//! Interactive GameHall client.
//!
//! Connects to the session server as a user and sends commands typed at the
//! prompt (`match`, `create`, `join <room_id>`, `sync <json>`, `auth <token>`,
//! `leave`, or a raw JSON envelope). Reconnects on connection loss (max 5
//! attempts with 5 second interval); a refused upgrade exits immediately.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin gamehall-client -- --uid 1001
//! cargo run --bin gamehall-client -- --uid 1002 --game tic-tac-toe --url ws://127.0.0.1:3000/game
//! ```

use clap::Parser;

use gamehall_client::{connect_url, run_client};
use gamehall_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "gamehall-client", version)]
#[command(about = "Interactive GameHall client", long_about = None)]
struct Args {
    /// User id to connect as (non-zero)
    #[arg(short = 'u', long)]
    uid: u64,

    /// Game to play
    #[arg(short = 'g', long, default_value = "tic-tac-toe")]
    game: String,

    /// Base WebSocket URL of the server (without the game name)
    #[arg(long, default_value = "ws://127.0.0.1:3000/game")]
    url: String,

    /// Origin header to send
    #[arg(short = 'o', long, default_value = "http://localhost")]
    origin: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = setup_logger(env!("CARGO_BIN_NAME"), "info", false, None) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let args = Args::parse();
    let url = connect_url(&args.url, &args.game, args.uid);

    if let Err(e) = run_client(url, Some(args.origin)).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
