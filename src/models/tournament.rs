//! Tournament, TournamentStatus and TournamentError.

use crate::models::game::{GameMatch, MatchId};
use crate::models::round::{Round, RoundId, RoundKind};
use crate::roster::RosterError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during bracket operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("No confirmed participants to build a bracket from")]
    NoParticipants,
    #[error("Tournament not found")]
    TournamentNotFound(TournamentId),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    #[error("Round not found: {0}")]
    RoundNotFound(String),
    /// Not every match of the round has a result (or the round has no matches).
    #[error("{round} is not ready: {completed} of {total} matches completed")]
    RoundNotReady {
        round: String,
        completed: usize,
        total: usize,
    },
    /// The round after this one already holds matches.
    #[error("{0} has already been advanced")]
    RoundAlreadyAdvanced(String),
    #[error("{winner} is not playing in match {code}")]
    InvalidWinner { code: String, winner: String },
    #[error("Match {0} already has a result")]
    MatchAlreadyCompleted(String),
    /// Tournament is not in a state that allows this action.
    #[error("Invalid state for this action")]
    InvalidState,
    #[error("lock error")]
    LockPoisoned,
    #[error(transparent)]
    Roster(#[from] RosterError),
}

impl TournamentError {
    /// Lookup failures, as opposed to rejected requests.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TournamentError::TournamentNotFound(_)
                | TournamentError::MatchNotFound(_)
                | TournamentError::RoundNotFound(_)
        )
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Registered, no bracket yet.
    #[default]
    Pending,
    /// Bracket built, matches being played.
    Active,
    /// Final decided (or a terminal round advanced).
    Completed,
    Cancelled,
}

/// Full tournament state: rounds and matches, relational by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub max_participants: u32,
    pub status: TournamentStatus,
    /// Round currently being played. None before initialization and after completion.
    pub current_round: Option<RoundId>,
    /// Roster size at the last initialization.
    pub participant_count: usize,
    pub rounds: Vec<Round>,
    pub matches: Vec<GameMatch>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament in Pending state with no bracket.
    pub fn new(max_participants: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            max_participants,
            status: TournamentStatus::Pending,
            current_round: None,
            participant_count: 0,
            rounds: Vec::new(),
            matches: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Drop every round and match (re-initialization).
    pub fn clear_bracket(&mut self) {
        self.rounds.clear();
        self.matches.clear();
        self.current_round = None;
    }

    pub fn round(&self, id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == id)
    }

    pub fn round_mut(&mut self, id: RoundId) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.id == id)
    }

    pub fn round_by_kind(&self, kind: RoundKind) -> Option<&Round> {
        self.rounds.iter().find(|r| r.kind == kind)
    }

    /// Look a round up by its display name.
    pub fn round_by_name(&self, name: &str) -> Option<&Round> {
        let kind = RoundKind::from_label(name)?;
        self.round_by_kind(kind)
    }

    /// Round the tournament is currently playing.
    pub fn current(&self) -> Option<&Round> {
        self.current_round.and_then(|id| self.round(id))
    }

    /// Matches of a round in sequence order.
    pub fn matches_in(&self, round_id: RoundId) -> Vec<&GameMatch> {
        let mut matches: Vec<_> = self
            .matches
            .iter()
            .filter(|m| m.round_id == round_id)
            .collect();
        matches.sort_by_key(|m| m.seq);
        matches
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Cancel the tournament (any state except Completed). Rounds and matches are kept.
    pub fn cancel(&mut self) -> Result<(), TournamentError> {
        if self.status == TournamentStatus::Completed {
            return Err(TournamentError::InvalidState);
        }
        self.status = TournamentStatus::Cancelled;
        self.current_round = None;
        self.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_refused_once_completed() {
        let mut t = Tournament::new(8);
        t.status = TournamentStatus::Completed;
        assert!(matches!(t.cancel(), Err(TournamentError::InvalidState)));

        let mut t = Tournament::new(8);
        t.cancel().unwrap();
        assert_eq!(t.status, TournamentStatus::Cancelled);
    }

    #[test]
    fn round_lookup_by_name_ignores_case() {
        let mut t = Tournament::new(8);
        t.rounds.push(Round::new(RoundKind::Quarterfinal, 1, 4));
        assert!(t.round_by_name("quarterfinal").is_some());
        assert!(t.round_by_name("Semifinal").is_none());
        assert!(t.round_by_name("Round of 64").is_none());
    }
}
