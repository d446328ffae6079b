//! Authoritative match state

use serde::{Deserialize, Serialize};

use super::bases::Base;
use super::board::Board;
use super::hex::Hex;
use super::{PawnId, PlayerIndex, Roll};

/// Maximum pawns a player may have on the board at once
pub const MAX_PAWNS_PER_PLAYER: usize = 6;

/// Smallest and largest supported rosters
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Lobby: players joining and readying up
    Waiting,
    /// Board generated, turns in progress
    Playing,
    /// Terminal
    Ended,
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The mover wiped out another player's last pawn
    Victory { winner: PlayerIndex },
    /// The mover lost their own last pawn
    Eliminated { player: PlayerIndex },
}

/// A seated player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub index: PlayerIndex,
    pub nickname: String,
    pub ready: bool,
    pub score: u32,
}

/// A pawn on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pawn {
    pub id: PawnId,
    pub owner: PlayerIndex,
    pub q: i32,
    pub r: i32,
    /// Last roll that placed or moved this pawn
    pub value: u8,
}

impl Pawn {
    pub fn hex(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

/// Full state of one match
#[derive(Debug, Clone)]
pub struct MatchState {
    pub(crate) code: String,
    pub(crate) max_players: usize,
    pub(crate) radius: i32,
    pub(crate) players: Vec<Player>,
    pub(crate) board: Option<Board>,
    pub(crate) bases: Vec<Base>,
    pub(crate) pawns: Vec<Pawn>,
    pub(crate) turn: PlayerIndex,
    pub(crate) status: MatchStatus,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) next_pawn_id: PawnId,
}

impl MatchState {
    pub fn new(code: impl Into<String>, max_players: usize, radius: i32) -> Self {
        Self {
            code: code.into(),
            max_players,
            radius,
            players: Vec::new(),
            board: None,
            bases: Vec::new(),
            pawns: Vec::new(),
            turn: 0,
            status: MatchStatus::Waiting,
            outcome: None,
            next_pawn_id: 1,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn turn(&self) -> PlayerIndex {
        self.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: PlayerIndex) -> Option<&Player> {
        self.players.get(index as usize)
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    pub fn pawns(&self) -> &[Pawn] {
        &self.pawns
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.id == id)
    }

    pub fn pawn_at(&self, hex: Hex) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.hex() == hex)
    }

    /// Number of pawns a player currently fields
    pub fn pawn_count(&self, owner: PlayerIndex) -> usize {
        self.pawns.iter().filter(|p| p.owner == owner).count()
    }

    /// Pawn counts indexed by player
    pub(crate) fn pawn_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.players.len()];
        for pawn in &self.pawns {
            if let Some(count) = counts.get_mut(pawn.owner as usize) {
                *count += 1;
            }
        }
        counts
    }

    pub fn score(&self, index: PlayerIndex) -> Option<u32> {
        self.player(index).map(|p| p.score)
    }

    pub(crate) fn award_point(&mut self, index: PlayerIndex) {
        if let Some(player) = self.players.get_mut(index as usize) {
            player.score += 1;
        }
    }

    pub(crate) fn remove_pawn(&mut self, id: PawnId) {
        self.pawns.retain(|p| p.id != id);
    }

    pub(crate) fn spawn_pawn(&mut self, owner: PlayerIndex, at: Hex, roll: Roll) -> PawnId {
        let id = self.next_pawn_id;
        self.next_pawn_id += 1;
        self.pawns.push(Pawn {
            id,
            owner,
            q: at.q,
            r: at.r,
            value: roll.value(),
        });
        id
    }
}
