//! Data structures for the bracket: participants, rounds, matches, tournament state.

mod game;
mod participant;
mod round;
mod tournament;
mod view;

pub use game::{match_code, GameMatch, MatchId};
pub use participant::{Participant, ParticipantId};
pub use round::{Round, RoundId, RoundKind};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentStatus};
pub use view::{
    AdvanceSummary, BracketView, InitializeSummary, MatchView, RecordSummary, RoundView,
    COMPLETED_LABEL,
};
