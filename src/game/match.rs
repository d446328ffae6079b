//! A live match: rules state, dice, and the connections seated in it

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::ws::protocol::{ClientMsg, ServerMsg, MAX_CHAT_LEN};

use super::dice::Dice;
use super::error::{RuleError, RuleResult};
use super::hex::Hex;
use super::lobby::ReadyChange;
use super::snapshot::{MatchSnapshot, SnapshotBuilder};
use super::state::{MatchState, MatchStatus};
use super::turn::TurnReport;
use super::{ConnectionId, PlayerIndex, Roll};

/// Messages produced by one intent
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Sent only to the originating connection
    pub reply: Option<ServerMsg>,
    /// Sent to every connection seated in the match
    pub broadcast: Option<ServerMsg>,
}

impl Dispatch {
    fn broadcast(msg: ServerMsg) -> Self {
        Self {
            reply: None,
            broadcast: Some(msg),
        }
    }

    fn reject(err: RuleError) -> Self {
        // Malformed input is dropped without a reply
        if err == RuleError::MalformedIntent {
            return Self::default();
        }
        Self {
            reply: Some(ServerMsg::rejected(err)),
            broadcast: None,
        }
    }
}

/// The authoritative game match
pub struct GameMatch {
    state: MatchState,
    dice: Dice,
    seed: u64,
    pending_roll: Option<Roll>,
    seats: HashMap<ConnectionId, PlayerIndex>,
    snapshots: SnapshotBuilder,
}

impl GameMatch {
    /// Create a new match in the lobby phase
    pub fn new(code: impl Into<String>, max_players: usize, radius: i32, seed: u64) -> Self {
        Self {
            state: MatchState::new(code, max_players, radius),
            dice: Dice::from_seed(seed),
            seed,
            pending_roll: None,
            seats: HashMap::new(),
            snapshots: SnapshotBuilder::new(),
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn code(&self) -> &str {
        self.state.code()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn pending_roll(&self) -> Option<Roll> {
        self.pending_roll
    }

    /// Current full state, stamped with the next version
    pub fn snapshot(&mut self) -> MatchSnapshot {
        self.snapshots.build(&self.state, self.pending_roll)
    }

    /// Seat held by a connection, if any
    pub fn seat_of(&self, conn: ConnectionId) -> Option<PlayerIndex> {
        self.seats.get(&conn).copied()
    }

    /// Apply one intent from a connection
    pub fn handle(&mut self, conn: ConnectionId, msg: ClientMsg) -> Dispatch {
        match self.apply(conn, msg) {
            Ok(dispatch) => dispatch,
            Err(err) => {
                debug!(
                    code = %self.state.code(),
                    conn = %conn,
                    reason = err.code(),
                    "Intent rejected"
                );
                Dispatch::reject(err)
            }
        }
    }

    /// Unbind a departing connection. Game state is left untouched.
    pub fn handle_leave(&mut self, conn: ConnectionId) -> ServerMsg {
        let player_id = self.seats.remove(&conn);
        info!(
            code = %self.state.code(),
            conn = %conn,
            player = ?player_id,
            "Connection left match"
        );
        ServerMsg::PlayerLeft { player_id }
    }

    fn apply(&mut self, conn: ConnectionId, msg: ClientMsg) -> RuleResult<Dispatch> {
        if self.state.status() == MatchStatus::Ended {
            return Err(RuleError::MatchEnded);
        }

        match msg {
            ClientMsg::Join { nickname, .. } => self.handle_join(conn, &nickname),
            ClientMsg::Ready => {
                let player = self.seat(conn)?;
                self.handle_ready(player)
            }
            ClientMsg::Roll => {
                let player = self.seat(conn)?;
                self.handle_roll(player)
            }
            ClientMsg::Move { pawn_id, q, r } => {
                let player = self.seat(conn)?;
                let roll = self.take_roll(player)?;
                let report = self
                    .state
                    .move_pawn(player, pawn_id, Hex::new(q, r), roll)?;
                Ok(self.after_action(player, roll, report))
            }
            ClientMsg::Place { q, r } => {
                let player = self.seat(conn)?;
                let roll = self.take_roll(player)?;
                let report = self.state.place_pawn(player, Hex::new(q, r), roll)?;
                Ok(self.after_action(player, roll, report))
            }
            ClientMsg::Pass => {
                let player = self.seat(conn)?;
                self.state.pass_turn(player)?;
                self.pending_roll = None;
                info!(code = %self.state.code(), player, "Turn passed");
                Ok(Dispatch::broadcast(self.state_update()))
            }
            ClientMsg::Chat { text } => {
                let player = self.seat(conn)?;
                let text: String = text.trim().chars().take(MAX_CHAT_LEN).collect();
                if text.is_empty() {
                    return Err(RuleError::MalformedIntent);
                }
                Ok(Dispatch::broadcast(ServerMsg::ChatRelay { from: player, text }))
            }
        }
    }

    fn handle_join(&mut self, conn: ConnectionId, nickname: &str) -> RuleResult<Dispatch> {
        if self.seats.contains_key(&conn) {
            return Err(RuleError::DuplicatePlayer);
        }

        let player_id = self.state.join(nickname)?;
        self.seats.insert(conn, player_id);

        info!(
            code = %self.state.code(),
            player = player_id,
            roster = self.state.players().len(),
            max_players = self.state.max_players(),
            "Player joined match"
        );

        Ok(Dispatch {
            reply: Some(ServerMsg::Welcome {
                code: self.state.code().to_string(),
                player_id,
            }),
            broadcast: Some(self.lobby_update()),
        })
    }

    fn handle_ready(&mut self, player: PlayerIndex) -> RuleResult<Dispatch> {
        match self.state.mark_ready(player)? {
            ReadyChange::Unchanged => Ok(Dispatch::default()),
            ReadyChange::Updated => Ok(Dispatch::broadcast(self.lobby_update())),
            ReadyChange::Started => {
                self.pending_roll = None;
                info!(
                    code = %self.state.code(),
                    players = self.state.players().len(),
                    bases = self.state.bases().len(),
                    "Match started"
                );
                let state = self.snapshots.build(&self.state, None);
                Ok(Dispatch::broadcast(ServerMsg::MatchStart { state }))
            }
        }
    }

    /// Draw the die. A roll already pending is kept, so re-rolling is impossible.
    fn handle_roll(&mut self, player: PlayerIndex) -> RuleResult<Dispatch> {
        self.state.ensure_turn(player)?;

        if self.pending_roll.is_none() {
            let roll = self.dice.roll();
            self.pending_roll = Some(roll);
            debug!(code = %self.state.code(), player, roll = roll.value(), "Die rolled");
        }

        Ok(Dispatch::broadcast(self.state_update()))
    }

    /// Turn order is checked before the roll so an out-of-turn player hears
    /// about the turn, not the die.
    fn take_roll(&self, player: PlayerIndex) -> RuleResult<Roll> {
        self.state.ensure_turn(player)?;
        self.pending_roll.ok_or(RuleError::RollRequired)
    }

    fn after_action(&mut self, player: PlayerIndex, roll: Roll, report: TurnReport) -> Dispatch {
        self.pending_roll = None;

        info!(
            code = %self.state.code(),
            player,
            roll = roll.value(),
            resolution = ?report.resolution,
            next_turn = self.state.turn(),
            "Action resolved"
        );
        if let Some(outcome) = report.outcome {
            info!(code = %self.state.code(), outcome = ?outcome, "Match ended");
        }

        Dispatch::broadcast(self.state_update())
    }

    fn seat(&self, conn: ConnectionId) -> RuleResult<PlayerIndex> {
        self.seat_of(conn).ok_or(RuleError::UnknownPlayer)
    }

    fn state_update(&mut self) -> ServerMsg {
        ServerMsg::StateUpdate {
            state: self.snapshot(),
        }
    }

    fn lobby_update(&self) -> ServerMsg {
        let players = self.state.players();
        ServerMsg::LobbyUpdate {
            players: players.iter().map(|p| p.index).collect(),
            ready: self.state.ready_list(),
            nicknames: players
                .iter()
                .map(|p| (p.index, p.nickname.clone()))
                .collect::<BTreeMap<_, _>>(),
            max_players: self.state.max_players(),
        }
    }
}
