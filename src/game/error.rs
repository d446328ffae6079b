//! Intent rejection reasons

use serde::Serialize;

/// Why an intent was rejected. A rejected intent never changes match state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RuleError {
    #[error("Connection already holds a seat in this match")]
    DuplicatePlayer,

    #[error("It is not your turn")]
    NotYourTurn,

    #[error("No such pawn under your control")]
    UnknownPawn,

    #[error("Destination is not reachable with this roll")]
    IllegalDestination,

    #[error("Cannot capture your own pawn")]
    SelfCaptureForbidden,

    #[error("Enemy pawn is stronger than your roll")]
    InsufficientRoll,

    #[error("Match is full")]
    RosterFull,

    #[error("Match has ended")]
    MatchEnded,

    #[error("Malformed intent")]
    MalformedIntent,

    #[error("Match has not started yet")]
    MatchNotStarted,

    #[error("Player has not joined this match")]
    UnknownPlayer,

    #[error("Already fielding the maximum number of pawns")]
    PawnLimitReached,

    #[error("Roll the die first")]
    RollRequired,
}

impl RuleError {
    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicatePlayer => "duplicate_player",
            Self::NotYourTurn => "not_your_turn",
            Self::UnknownPawn => "unknown_pawn",
            Self::IllegalDestination => "illegal_destination",
            Self::SelfCaptureForbidden => "self_capture_forbidden",
            Self::InsufficientRoll => "insufficient_roll",
            Self::RosterFull => "roster_full",
            Self::MatchEnded => "match_ended",
            Self::MalformedIntent => "malformed_intent",
            Self::MatchNotStarted => "match_not_started",
            Self::UnknownPlayer => "unknown_player",
            Self::PawnLimitReached => "pawn_limit_reached",
            Self::RollRequired => "roll_required",
        }
    }
}

pub type RuleResult<T> = Result<T, RuleError>;
