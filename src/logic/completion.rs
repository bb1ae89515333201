//! Completion detection for rounds and the single terminal transition of a tournament.

use crate::models::{GameMatch, RoundId, Tournament, TournamentStatus};

/// A round is complete when it has at least one match and every match has a result.
/// An empty round is never complete.
pub fn is_round_complete(matches: &[&GameMatch]) -> bool {
    !matches.is_empty() && matches.iter().all(|m| m.is_completed)
}

/// Re-read the round's matches and close the round if they are all decided.
/// Returns true only for the call that flipped the flag.
pub fn close_round_if_complete(tournament: &mut Tournament, round_id: RoundId, actor: &str) -> bool {
    if !is_round_complete(&tournament.matches_in(round_id)) {
        return false;
    }
    match tournament.round_mut(round_id) {
        Some(round) => round.mark_completed(actor),
        None => false,
    }
}

/// Move the tournament to Completed. No-op (returns false) if it already is.
///
/// Both the result recorder (Final decided) and the round advancer
/// (terminal round advanced) end the tournament through here.
pub fn complete_tournament(tournament: &mut Tournament) -> bool {
    if tournament.status == TournamentStatus::Completed {
        return false;
    }
    tournament.status = TournamentStatus::Completed;
    tournament.current_round = None;
    tournament.touch();
    log::info!("Tournament {} completed", tournament.id);
    true
}
