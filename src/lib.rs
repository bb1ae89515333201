//! Knockout bracket engine: library with models and bracket progression logic.

pub mod audit;
pub mod engine;
pub mod logic;
pub mod models;
pub mod roster;

pub use audit::{AuditError, AuditEvent, AuditSink, LogAudit, MemoryAudit};
pub use engine::BracketEngine;
pub use logic::{
    advance_round, build_bracket, is_round_complete, pair_winners, record_result,
    OddWinnerPolicy, ODD_WINNER_POLICY,
};
pub use models::{
    AdvanceSummary, BracketView, GameMatch, InitializeSummary, MatchId, MatchView, Participant,
    ParticipantId, RecordSummary, Round, RoundId, RoundKind, RoundView, Tournament,
    TournamentError, TournamentId, TournamentStatus, COMPLETED_LABEL,
};
pub use roster::{read_csv_names, Roster, RosterError, RosterProvider};
