//! Lobby: join and ready handling before the board exists.
//!
//! The match leaves `Waiting` exactly once, when every seat is taken and
//! every seated player is ready. Board generation and base distribution
//! happen at that moment and never again.

use super::bases::distribute_bases;
use super::board::Board;
use super::error::{RuleError, RuleResult};
use super::state::{MatchState, MatchStatus, Player};
use super::PlayerIndex;

/// Effect of a ready signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyChange {
    /// Already ready, unknown player, or lobby already closed
    Unchanged,
    /// Player marked ready, still waiting on others
    Updated,
    /// Last ready signal: board generated and match started
    Started,
}

impl MatchState {
    /// Seat a new player. Indices are handed out in join order.
    pub fn join(&mut self, nickname: &str) -> RuleResult<PlayerIndex> {
        match self.status {
            MatchStatus::Ended => return Err(RuleError::MatchEnded),
            MatchStatus::Playing => return Err(RuleError::RosterFull),
            MatchStatus::Waiting => {}
        }

        if self.players.len() >= self.max_players {
            return Err(RuleError::RosterFull);
        }

        let index = self.players.len() as PlayerIndex;
        let nickname = match nickname.trim() {
            "" => format!("Player {index}"),
            name => name.to_string(),
        };

        self.players.push(Player {
            index,
            nickname,
            ready: false,
            score: 0,
        });

        Ok(index)
    }

    /// Mark a player ready; starts the match once everyone is.
    pub fn mark_ready(&mut self, index: PlayerIndex) -> RuleResult<ReadyChange> {
        match self.status {
            MatchStatus::Ended => return Err(RuleError::MatchEnded),
            MatchStatus::Playing => return Ok(ReadyChange::Unchanged),
            MatchStatus::Waiting => {}
        }

        let Some(player) = self.players.get_mut(index as usize) else {
            return Ok(ReadyChange::Unchanged);
        };
        if player.ready {
            return Ok(ReadyChange::Unchanged);
        }
        player.ready = true;

        if self.can_start() {
            self.start();
            Ok(ReadyChange::Started)
        } else {
            Ok(ReadyChange::Updated)
        }
    }

    /// Full roster and everyone ready
    pub fn can_start(&self) -> bool {
        self.status == MatchStatus::Waiting
            && self.players.len() == self.max_players
            && self.players.iter().all(|p| p.ready)
    }

    /// Indices of players who signalled ready
    pub fn ready_list(&self) -> Vec<PlayerIndex> {
        self.players
            .iter()
            .filter(|p| p.ready)
            .map(|p| p.index)
            .collect()
    }

    fn start(&mut self) {
        let board = Board::generate(self.radius);
        self.bases = distribute_bases(board.base_candidates(), self.players.len());
        self.board = Some(board);
        self.pawns.clear();
        self.turn = 0;
        self.status = MatchStatus::Playing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby(max_players: usize) -> MatchState {
        MatchState::new("ABC123", max_players, 4)
    }

    #[test]
    fn test_join_assigns_sequential_indices() {
        let mut state = lobby(3);
        assert_eq!(state.join("Ana"), Ok(0));
        assert_eq!(state.join("Bruno"), Ok(1));
        assert_eq!(state.join("  "), Ok(2));
        assert_eq!(state.players()[2].nickname, "Player 2");
        assert!(state.players().iter().all(|p| p.score == 0 && !p.ready));
        assert_eq!(state.status(), MatchStatus::Waiting);
    }

    #[test]
    fn test_join_rejects_when_full() {
        let mut state = lobby(2);
        state.join("a").unwrap();
        state.join("b").unwrap();
        assert_eq!(state.join("c"), Err(RuleError::RosterFull));
        assert_eq!(state.players().len(), 2);
    }

    #[test]
    fn test_ready_is_idempotent_and_ignores_unknown_players() {
        let mut state = lobby(2);
        state.join("a").unwrap();
        state.join("b").unwrap();

        assert_eq!(state.mark_ready(0), Ok(ReadyChange::Updated));
        assert_eq!(state.mark_ready(0), Ok(ReadyChange::Unchanged));
        assert_eq!(state.mark_ready(9), Ok(ReadyChange::Unchanged));
        assert_eq!(state.ready_list(), vec![0]);
        assert_eq!(state.status(), MatchStatus::Waiting);
    }

    #[test]
    fn test_all_ready_but_roster_short_does_not_start() {
        let mut state = lobby(3);
        state.join("a").unwrap();
        state.join("b").unwrap();
        state.mark_ready(0).unwrap();
        assert_eq!(state.mark_ready(1), Ok(ReadyChange::Updated));
        assert_eq!(state.status(), MatchStatus::Waiting);
        assert!(state.board().is_none());
        assert!(state.bases().is_empty());
    }

    #[test]
    fn test_last_ready_starts_match() {
        let mut state = lobby(2);
        state.join("a").unwrap();
        state.join("b").unwrap();
        state.mark_ready(1).unwrap();
        assert_eq!(state.mark_ready(0), Ok(ReadyChange::Started));

        assert_eq!(state.status(), MatchStatus::Playing);
        assert_eq!(state.turn(), 0);
        assert!(state.pawns().is_empty());
        let board = state.board().expect("board generated");
        assert_eq!(board.tiles().len(), 61);
        assert_eq!(state.bases().len(), 6);
        assert_eq!(state.bases().iter().filter(|b| b.owner == 1).count(), 3);
    }

    #[test]
    fn test_no_join_after_start_and_nothing_after_end() {
        let mut state = lobby(2);
        state.join("a").unwrap();
        state.join("b").unwrap();
        state.mark_ready(0).unwrap();
        state.mark_ready(1).unwrap();
        assert_eq!(state.join("late"), Err(RuleError::RosterFull));
        assert_eq!(state.mark_ready(0), Ok(ReadyChange::Unchanged));

        state.status = MatchStatus::Ended;
        assert_eq!(state.join("late"), Err(RuleError::MatchEnded));
        assert_eq!(state.mark_ready(0), Err(RuleError::MatchEnded));
    }
}
