//! Turn engine: move and placement resolution, turn rotation and win detection

use super::combat::{CombatOutcome, CombatSystem};
use super::error::{RuleError, RuleResult};
use super::hex::Hex;
use super::state::{MatchState, MatchStatus, Outcome, MAX_PAWNS_PER_PLAYER};
use super::{PawnId, PlayerIndex, Roll};

/// What an accepted action did to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Pawn moved onto an empty tile
    Moved { pawn: PawnId },
    /// New pawn entered on an empty tile
    Placed { pawn: PawnId },
    /// Defender removed; `pawn` now stands on its tile
    Captured { pawn: PawnId, victim: PawnId },
    /// Equal values: defender removed along with the attacker, if it was on the board
    Traded {
        attacker: Option<PawnId>,
        defender: PawnId,
    },
}

/// Result of an accepted move or placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub resolution: Resolution,
    /// Set when this action ended the match
    pub outcome: Option<Outcome>,
}

impl MatchState {
    /// Move one of the player's pawns exactly `roll` tiles
    pub fn move_pawn(
        &mut self,
        player: PlayerIndex,
        pawn_id: PawnId,
        dest: Hex,
        roll: Roll,
    ) -> RuleResult<TurnReport> {
        self.ensure_turn(player)?;

        let pawn = self
            .pawn(pawn_id)
            .filter(|p| p.owner == player)
            .copied()
            .ok_or(RuleError::UnknownPawn)?;

        if !self.on_board(dest) || pawn.hex().distance_to(dest) != roll.distance() {
            return Err(RuleError::IllegalDestination);
        }

        let before = self.pawn_counts();
        let resolution = match self.pawn_at(dest).copied() {
            None => {
                self.relocate(pawn_id, dest, roll);
                Resolution::Moved { pawn: pawn_id }
            }
            Some(defender) if defender.owner == player => {
                return Err(RuleError::SelfCaptureForbidden);
            }
            Some(defender) => match CombatSystem::resolve(roll, defender.value) {
                CombatOutcome::AttackerWins => {
                    self.remove_pawn(defender.id);
                    self.award_point(player);
                    self.relocate(pawn_id, dest, roll);
                    Resolution::Captured {
                        pawn: pawn_id,
                        victim: defender.id,
                    }
                }
                CombatOutcome::MutualElimination => {
                    self.remove_pawn(defender.id);
                    self.remove_pawn(pawn_id);
                    self.award_point(player);
                    self.award_point(defender.owner);
                    Resolution::Traded {
                        attacker: Some(pawn_id),
                        defender: defender.id,
                    }
                }
                CombatOutcome::Repelled => return Err(RuleError::InsufficientRoll),
            },
        };

        Ok(self.finish_action(player, &before, resolution))
    }

    /// Bring a new pawn onto one of the player's bases, or the center on a 4
    pub fn place_pawn(
        &mut self,
        player: PlayerIndex,
        dest: Hex,
        roll: Roll,
    ) -> RuleResult<TurnReport> {
        self.ensure_turn(player)?;

        if self.pawn_count(player) >= MAX_PAWNS_PER_PLAYER {
            return Err(RuleError::PawnLimitReached);
        }
        if !self.is_entry(player, dest, roll) {
            return Err(RuleError::IllegalDestination);
        }

        let before = self.pawn_counts();
        let entering_center = dest == Hex::ORIGIN;
        let resolution = match self.pawn_at(dest).copied() {
            None => Resolution::Placed {
                pawn: self.spawn_pawn(player, dest, roll),
            },
            Some(defender) if defender.owner == player => {
                return Err(RuleError::SelfCaptureForbidden);
            }
            Some(defender) => {
                let outcome = if CombatSystem::center_entry_overrides(roll, entering_center) {
                    CombatOutcome::AttackerWins
                } else {
                    CombatSystem::resolve(roll, defender.value)
                };

                match outcome {
                    CombatOutcome::AttackerWins => {
                        self.remove_pawn(defender.id);
                        self.award_point(player);
                        Resolution::Captured {
                            pawn: self.spawn_pawn(player, dest, roll),
                            victim: defender.id,
                        }
                    }
                    CombatOutcome::MutualElimination => {
                        self.remove_pawn(defender.id);
                        self.award_point(player);
                        self.award_point(defender.owner);
                        Resolution::Traded {
                            attacker: None,
                            defender: defender.id,
                        }
                    }
                    CombatOutcome::Repelled => return Err(RuleError::InsufficientRoll),
                }
            }
        };

        Ok(self.finish_action(player, &before, resolution))
    }

    /// Give up the rest of the turn
    pub fn pass_turn(&mut self, player: PlayerIndex) -> RuleResult<()> {
        self.ensure_turn(player)?;
        self.advance_turn();
        Ok(())
    }

    /// Board tiles at exactly `roll` steps from the pawn. Occupancy is resolved
    /// when the move is applied, so occupied tiles are included.
    pub fn legal_destinations(&self, pawn_id: PawnId, roll: Roll) -> Vec<Hex> {
        match (self.pawn(pawn_id), self.board()) {
            (Some(pawn), Some(board)) => board.hexes_at_distance(pawn.hex(), roll.distance()),
            _ => Vec::new(),
        }
    }

    /// Tiles where the player may bring in a new pawn with this roll
    pub fn legal_entries(&self, player: PlayerIndex, roll: Roll) -> Vec<Hex> {
        let mut entries = Vec::new();
        if roll.value() == Roll::CENTER_ENTRY {
            entries.push(Hex::ORIGIN);
        }
        for base in self.bases.iter().filter(|b| b.owner == player) {
            if !entries.contains(&base.hex()) {
                entries.push(base.hex());
            }
        }
        entries
    }

    fn is_entry(&self, player: PlayerIndex, dest: Hex, roll: Roll) -> bool {
        (dest == Hex::ORIGIN && roll.value() == Roll::CENTER_ENTRY)
            || self
                .bases
                .iter()
                .any(|b| b.owner == player && b.hex() == dest)
    }

    /// Shared preconditions for every in-game action
    pub fn ensure_turn(&self, player: PlayerIndex) -> RuleResult<()> {
        match self.status {
            MatchStatus::Ended => return Err(RuleError::MatchEnded),
            MatchStatus::Waiting => return Err(RuleError::MatchNotStarted),
            MatchStatus::Playing => {}
        }
        if self.player(player).is_none() {
            return Err(RuleError::UnknownPlayer);
        }
        if self.turn != player {
            return Err(RuleError::NotYourTurn);
        }
        Ok(())
    }

    fn on_board(&self, hex: Hex) -> bool {
        self.board().is_some_and(|b| b.contains(hex))
    }

    fn relocate(&mut self, pawn_id: PawnId, dest: Hex, roll: Roll) {
        if let Some(pawn) = self.pawns.iter_mut().find(|p| p.id == pawn_id) {
            pawn.q = dest.q;
            pawn.r = dest.r;
            pawn.value = roll.value();
        }
    }

    fn advance_turn(&mut self) {
        if !self.players.is_empty() {
            self.turn = (self.turn + 1) % self.players.len() as PlayerIndex;
        }
    }

    /// Turn advances first so a terminal state still reports the next player
    fn finish_action(
        &mut self,
        mover: PlayerIndex,
        before: &[usize],
        resolution: Resolution,
    ) -> TurnReport {
        self.advance_turn();

        let outcome = self.detect_outcome(mover, before);
        if let Some(outcome) = outcome {
            self.status = MatchStatus::Ended;
            self.outcome = Some(outcome);
        }

        TurnReport {
            resolution,
            outcome,
        }
    }

    /// A player is out when their pawn count drops from at least one to zero.
    /// Players who never fielded a pawn are not counted as eliminated.
    fn detect_outcome(&self, mover: PlayerIndex, before: &[usize]) -> Option<Outcome> {
        let after = self.pawn_counts();
        let mover_idx = mover as usize;
        let mover_after = after.get(mover_idx).copied().unwrap_or(0);
        let mover_before = before.get(mover_idx).copied().unwrap_or(0);

        if mover_before > 0 && mover_after == 0 {
            return Some(Outcome::Eliminated { player: mover });
        }

        let wiped_out = before
            .iter()
            .zip(&after)
            .enumerate()
            .any(|(idx, (b, a))| idx != mover_idx && *b > 0 && *a == 0);

        if wiped_out && mover_after > 0 {
            Some(Outcome::Victory { winner: mover })
        } else {
            None
        }
    }
}
