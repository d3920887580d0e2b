//! UI layer: axum router, upgrade handler, session loop and message dispatch.

pub mod dispatch;
mod handler;
mod server;
mod session;
mod signal;
pub mod state;

pub use server::{Server, build_router};
pub use state::AppState;
