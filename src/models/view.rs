//! Read model and operation summaries returned to the admin application.

use crate::models::game::{GameMatch, MatchId};
use crate::models::round::Round;
use crate::models::tournament::{Tournament, TournamentId, TournamentStatus};
use serde::{Deserialize, Serialize};

/// Shown as the current round once the tournament is over.
pub const COMPLETED_LABEL: &str = "Tournament Completed";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeSummary {
    pub total_participants: usize,
    pub rounds_created: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub match_code: String,
    pub winner: String,
    pub score: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceSummary {
    pub from_round: String,
    /// Next round name, or `COMPLETED_LABEL`.
    pub to_round: String,
    pub completed_matches: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: MatchId,
    pub match_code: String,
    pub player1: String,
    pub player2: Option<String>,
    pub winner: Option<String>,
    pub score: Option<String>,
    pub is_completed: bool,
    pub judge: Option<String>,
    pub court: Option<String>,
}

impl From<&GameMatch> for MatchView {
    fn from(m: &GameMatch) -> Self {
        Self {
            id: m.id,
            match_code: m.code.clone(),
            player1: m.player1.clone(),
            player2: m.player2.clone(),
            winner: m.winner.clone(),
            score: m.score.clone(),
            is_completed: m.is_completed,
            judge: m.judge.clone(),
            court: m.court.clone(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub name: String,
    pub order: u32,
    pub is_completed: bool,
    pub matches: Vec<MatchView>,
}

/// Whole bracket for display. Rounds are sorted by ordinal, so the
/// 3rd place match renders before the Final.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub id: TournamentId,
    pub status: TournamentStatus,
    pub current_round: Option<String>,
    pub rounds: Vec<RoundView>,
}

impl From<&Tournament> for BracketView {
    fn from(t: &Tournament) -> Self {
        let current_round = if t.status == TournamentStatus::Completed {
            Some(COMPLETED_LABEL.to_string())
        } else {
            t.current().map(|r| r.name.clone())
        };
        let mut rounds: Vec<&Round> = t.rounds.iter().collect();
        rounds.sort_by_key(|r| r.order);
        let rounds = rounds
            .into_iter()
            .map(|r| RoundView {
                name: r.name.clone(),
                order: r.order,
                is_completed: r.is_completed,
                matches: t.matches_in(r.id).into_iter().map(MatchView::from).collect(),
            })
            .collect();
        Self {
            id: t.id,
            status: t.status,
            current_round,
            rounds,
        }
    }
}
