//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::state::{MAX_PLAYERS, MIN_PLAYERS};
use crate::game::{MatchSnapshot, PawnId, PlayerIndex, RuleError};

/// Longest chat line relayed, in characters
pub const MAX_CHAT_LEN: usize = 280;

/// Messages sent from client to server.
///
/// Every frame also carries a top-level `code` naming the match. The acting
/// player is derived from the connection, so client-supplied player ids are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Take a seat in the match
    Join {
        #[serde(default)]
        nickname: String,
        /// Roster size, used only when this intent creates the match
        #[serde(default, alias = "maxPlayers")]
        max_players: Option<usize>,
    },

    /// Signal readiness in the lobby
    Ready,

    /// Draw the die for the current turn
    Roll,

    /// Move a pawn by the pending roll
    Move {
        #[serde(alias = "pawnId")]
        pawn_id: PawnId,
        q: i32,
        r: i32,
    },

    /// Bring a new pawn in with the pending roll
    Place { q: i32, r: i32 },

    /// Skip the rest of the turn
    Pass,

    Chat { text: String },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Seat confirmation, sent only to the joining connection
    Welcome { code: String, player_id: PlayerIndex },

    /// Lobby roster changed
    LobbyUpdate {
        players: Vec<PlayerIndex>,
        ready: Vec<PlayerIndex>,
        nicknames: BTreeMap<PlayerIndex, String>,
        max_players: usize,
    },

    /// Everyone is ready; board and bases are in the state
    MatchStart { state: MatchSnapshot },

    /// State after an accepted roll, move, placement or pass
    StateUpdate { state: MatchSnapshot },

    /// Intent refused; sent only to its sender
    Rejected { reason: RuleError, message: String },

    ChatRelay { from: PlayerIndex, text: String },

    /// A connection left the match. Seats are never freed.
    PlayerLeft { player_id: Option<PlayerIndex> },
}

impl ServerMsg {
    pub fn rejected(reason: RuleError) -> Self {
        Self::Rejected {
            reason,
            message: reason.to_string(),
        }
    }
}

/// Reasons an incoming frame is dropped before it reaches a match
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing match code")]
    MissingCode,

    #[error("Unsupported player count: {0}")]
    InvalidPlayerCount(usize),
}

/// Upper-case and trim a match code
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Decode a text frame into its match code and intent
pub fn decode_client_msg(text: &str) -> Result<(String, ClientMsg), ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let code = value
        .get("code")
        .and_then(|c| c.as_str())
        .map(normalize_code)
        .filter(|c| !c.is_empty())
        .ok_or(ProtocolError::MissingCode)?;

    let msg: ClientMsg = serde_json::from_value(value)?;

    if let ClientMsg::Join {
        max_players: Some(n),
        ..
    } = msg
    {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
            return Err(ProtocolError::InvalidPlayerCount(n));
        }
    }

    Ok((code, msg))
}
