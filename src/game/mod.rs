//! Game rules modules

pub mod bases;
pub mod board;
pub mod combat;
pub mod dice;
pub mod error;
pub mod hex;
pub mod lobby;
pub mod r#match;
pub mod snapshot;
pub mod state;
pub mod turn;

pub use bases::Base;
pub use board::{Board, Tile, TileKind};
pub use combat::{CombatOutcome, CombatSystem};
pub use dice::{Dice, Roll};
pub use error::{RuleError, RuleResult};
pub use hex::Hex;
pub use r#match::{Dispatch, GameMatch};
pub use snapshot::{MatchSnapshot, SnapshotBuilder};
pub use state::{MatchState, MatchStatus, Outcome, Pawn, Player};
pub use turn::{Resolution, TurnReport};

/// Seat number inside a match, assigned in join order
pub type PlayerIndex = u32;

/// Pawn identifier, unique within a match
pub type PawnId = u32;

/// Identifies one WebSocket connection
pub type ConnectionId = uuid::Uuid;
