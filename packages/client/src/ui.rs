//! Terminal helpers.

use std::io::Write;

pub const PROMPT: &str = "> ";

/// Redisplay the prompt after printing an incoming message
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
