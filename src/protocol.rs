//! Wire vocabulary for the coordinator
//!
//! Every line the server sends is defined here, so the session and lobby code
//! never hard-code protocol text. The protocol is newline-delimited UTF-8:
//! informational lines server-to-client, single-token replies client-to-server.

use crate::types::Move;

/// First line sent to every new connection
pub const WELCOME_LINE: &str = "Welcome to the duel server!";

/// Prompt for the handshake name exchange
pub const NAME_PROMPT: &str = "Enter your name:";

/// Courtesy notice emitted when a participant enters the waiting pool
pub const POOL_NOTICE: &str = "=== You are in the lobby. Waiting for another player... ===";

/// Sent after a move token that did not parse
pub const INVALID_MOVE_LINE: &str = "Invalid move. Please enter rock/paper/scissors.";

/// Rematch question, answered with a y/n token
pub const REMATCH_PROMPT: &str = "Play again? (y/n):";

/// Broadcast when both participants accept a rematch
pub const NEW_MATCH_LINE: &str = "Starting a new match!";

/// Sent to a participant that declined the rematch
pub const FAREWELL_LINE: &str = "Goodbye! Returning to the lobby.";

/// Broadcast when both participants decline the rematch
pub const CLOSING_LINE: &str = "Match over. Both players return to the lobby.";

/// Handshake greeting once a display name is settled
pub fn greeting_line(name: &str) -> String {
    format!("Hello, {}!", name)
}

/// Match-start announcement naming both identities
pub fn match_start_line(first: &str, second: &str) -> String {
    format!("=== Match starting: {} vs {} ===", first, second)
}

/// Header broadcast at the top of every round
pub fn round_header(round: u32) -> String {
    format!("-- ROUND {} --", round)
}

/// Per-round move prompt addressed to one participant
pub fn move_prompt(name: &str) -> String {
    format!("{}, enter your move [rock/paper/scissors]:", name)
}

/// Verdict line for a tied round, showing both raw moves
pub fn tie_line(first_move: Move, second_move: Move) -> String {
    format!("Tie! ({} vs {})", first_move, second_move)
}

/// Verdict line for a decided round
pub fn round_win_line(winner: &str, winning_move: Move, losing_move: Move) -> String {
    format!(
        "{} wins this round! ({} beats {})",
        winner, winning_move, losing_move
    )
}

/// Running score, broadcast after every round including ties
pub fn score_line(first: &str, first_wins: u8, second_wins: u8, second: &str) -> String {
    format!("Score: {} {} - {} {}", first, first_wins, second_wins, second)
}

/// Match-winner announcement
pub fn match_winner_line(winner: &str) -> String {
    format!(">>> {} WINS THE MATCH! <<<", winner)
}

/// A rematch reply is affirmative iff it starts with the `y` token after trimming,
/// case-insensitive
pub fn is_affirmative(reply: &str) -> bool {
    reply.trim().to_lowercase().starts_with('y')
}
