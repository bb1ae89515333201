//! Recording the outcome of a single match.

use crate::logic::completion::{close_round_if_complete, complete_tournament};
use crate::models::{MatchId, RecordSummary, RoundKind, Tournament, TournamentError, TournamentStatus};

/// Record `winner` and `score` for a match, then close its round if every match is decided.
///
/// The winner must occupy one of the match's slots. A decided match is never overwritten.
/// Closing the Final ends the tournament.
pub fn record_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    winner: &str,
    score: Option<&str>,
    actor: &str,
) -> Result<RecordSummary, TournamentError> {
    if !matches!(
        tournament.status,
        TournamentStatus::Active | TournamentStatus::Completed
    ) {
        return Err(TournamentError::InvalidState);
    }
    let winner = winner.trim();
    let score = score.map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_completed {
        return Err(TournamentError::MatchAlreadyCompleted(m.code.clone()));
    }
    if winner.is_empty() || !m.has_participant(winner) {
        return Err(TournamentError::InvalidWinner {
            code: m.code.clone(),
            winner: winner.to_string(),
        });
    }
    m.complete(winner, score.clone());
    let round_id = m.round_id;
    let summary = RecordSummary {
        match_code: m.code.clone(),
        winner: winner.to_string(),
        score,
    };
    log::debug!(
        "Tournament {}: {} won by {}",
        tournament.id,
        summary.match_code,
        summary.winner
    );

    if close_round_if_complete(tournament, round_id, actor) {
        let kind = tournament.round(round_id).map(|r| r.kind);
        log::info!(
            "Tournament {}: {} complete",
            tournament.id,
            kind.map_or("round", RoundKind::label)
        );
        if kind == Some(RoundKind::Final) {
            complete_tournament(tournament);
        }
    }
    tournament.touch();
    Ok(summary)
}
