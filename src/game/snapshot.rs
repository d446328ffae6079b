//! Full-state snapshots for broadcast

use serde::Serialize;

use super::bases::Base;
use super::board::Tile;
use super::state::{MatchState, MatchStatus, Outcome, Pawn, Player};
use super::{PlayerIndex, Roll};

/// Everything a client needs to render a match
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    /// Increases with every snapshot of this match; clients drop older ones
    pub version: u64,
    pub code: String,
    pub status: MatchStatus,
    pub max_players: usize,
    pub radius: i32,
    pub players: Vec<Player>,
    pub tiles: Vec<Tile>,
    pub bases: Vec<Base>,
    pub pawns: Vec<Pawn>,
    pub turn: PlayerIndex,
    /// Roll drawn by the current player and not yet used
    pub roll: Option<Roll>,
    pub outcome: Option<Outcome>,
}

/// Builds versioned snapshots of one match
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    version: u64,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the most recent snapshot
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn build(&mut self, state: &MatchState, roll: Option<Roll>) -> MatchSnapshot {
        self.version += 1;

        MatchSnapshot {
            version: self.version,
            code: state.code().to_string(),
            status: state.status(),
            max_players: state.max_players(),
            radius: state.radius(),
            players: state.players().to_vec(),
            tiles: state
                .board()
                .map(|b| b.tiles().to_vec())
                .unwrap_or_default(),
            bases: state.bases().to_vec(),
            pawns: state.pawns().to_vec(),
            turn: state.turn(),
            roll,
            outcome: state.outcome(),
        }
    }
}
