//! Round advancement: next-round pairings from winners, 3rd place match from semifinal losers.

use crate::logic::completion::{complete_tournament, is_round_complete};
use crate::models::{
    AdvanceSummary, GameMatch, Round, RoundId, RoundKind, Tournament, TournamentError,
    TournamentStatus, COMPLETED_LABEL,
};

/// What happens to the last winner when a round produces an odd number of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OddWinnerPolicy {
    /// The unpaired winner gets no next-round match.
    Drop,
    /// The unpaired winner gets a bye match in the next round.
    CarryAsBye,
}

/// Policy applied by [`advance_round`].
pub const ODD_WINNER_POLICY: OddWinnerPolicy = OddWinnerPolicy::Drop;

/// Pair winners in order: (0,1), (2,3), ... The leftover of an odd count follows `policy`.
pub fn pair_winners(winners: &[String], policy: OddWinnerPolicy) -> Vec<(String, Option<String>)> {
    let mut pairs: Vec<_> = winners
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), Some(pair[1].clone())))
        .collect();
    if let [leftover] = winners.chunks_exact(2).remainder() {
        match policy {
            OddWinnerPolicy::Drop => {
                log::warn!("{} has no opponent and does not advance", leftover);
            }
            OddWinnerPolicy::CarryAsBye => pairs.push((leftover.clone(), None)),
        }
    }
    pairs
}

/// Kind of the round that follows `round`, or None for terminal rounds.
///
/// A "Round of N" opening round is re-derived from the thresholds applied to the
/// number of winners it produces; every other round follows the progression table.
pub fn next_round_kind(tournament: &Tournament, round: &Round) -> Option<RoundKind> {
    if round.kind.is_sized() && round.order == 1 {
        let winners = tournament.matches_in(round.id).len();
        return Some(RoundKind::first_for(winners));
    }
    round.kind.next()
}

/// Return the id of the shell for `kind`, creating it if the bracket lacks one.
fn ensure_round(tournament: &mut Tournament, kind: RoundKind) -> RoundId {
    if let Some(round) = tournament.round_by_kind(kind) {
        return round.id;
    }
    let round = Round::new(kind, kind.order(), kind.max_matches());
    let id = round.id;
    tournament.rounds.push(round);
    id
}

fn has_matches(tournament: &Tournament, kind: RoundKind) -> bool {
    tournament
        .round_by_kind(kind)
        .is_some_and(|r| !tournament.matches_in(r.id).is_empty())
}

/// Close `round_name` and move the bracket on.
///
/// Every match of the round must be decided (an empty round is never ready).
/// Winners are paired in match order into the next round; after the Semifinal the
/// two losers also meet in the 3rd Place Match. Advancing a terminal round
/// (Final or 3rd Place Match) completes the tournament.
pub fn advance_round(
    tournament: &mut Tournament,
    round_name: &str,
    actor: &str,
) -> Result<AdvanceSummary, TournamentError> {
    if !matches!(
        tournament.status,
        TournamentStatus::Active | TournamentStatus::Completed
    ) {
        return Err(TournamentError::InvalidState);
    }
    let round = tournament
        .round_by_name(round_name)
        .cloned()
        .ok_or_else(|| TournamentError::RoundNotFound(round_name.trim().to_string()))?;

    let played: Vec<GameMatch> = tournament
        .matches_in(round.id)
        .into_iter()
        .cloned()
        .collect();
    let refs: Vec<&GameMatch> = played.iter().collect();
    if !is_round_complete(&refs) {
        return Err(TournamentError::RoundNotReady {
            round: round.name.clone(),
            completed: played.iter().filter(|m| m.is_completed).count(),
            total: played.len(),
        });
    }

    let next = next_round_kind(tournament, &round);
    if round.advanced || next.is_some_and(|kind| has_matches(tournament, kind)) {
        return Err(TournamentError::RoundAlreadyAdvanced(round.name.clone()));
    }

    if let Some(r) = tournament.round_mut(round.id) {
        r.mark_completed(actor);
        r.advanced = true;
    }

    let to_round = match next {
        Some(kind) => {
            let next_id = ensure_round(tournament, kind);
            let winners: Vec<String> = played
                .iter()
                .filter_map(|m| m.winner.clone())
                .filter(|w| !w.trim().is_empty())
                .collect();
            let pairs = pair_winners(&winners, ODD_WINNER_POLICY);
            if pairs.is_empty() {
                log::warn!(
                    "Tournament {}: {} starts without matches ({} winner(s) from {})",
                    tournament.id,
                    kind,
                    winners.len(),
                    round.name
                );
            }
            tournament.matches.extend(
                pairs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (p1, p2))| GameMatch::new(next_id, kind, i + 1, p1, p2)),
            );

            if round.kind == RoundKind::Semifinal {
                create_third_place_match(tournament, &played);
            }

            tournament.current_round = Some(next_id);
            kind.label().to_string()
        }
        None => {
            complete_tournament(tournament);
            COMPLETED_LABEL.to_string()
        }
    };
    tournament.touch();

    log::info!(
        "Tournament {}: advanced {} -> {} ({} matches completed)",
        tournament.id,
        round.name,
        to_round,
        played.len()
    );

    Ok(AdvanceSummary {
        from_round: round.name,
        to_round,
        completed_matches: played.len(),
    })
}

/// The two semifinal losers meet in the 3rd Place Match, created at most once.
fn create_third_place_match(tournament: &mut Tournament, semifinals: &[GameMatch]) {
    if has_matches(tournament, RoundKind::ThirdPlace) {
        return;
    }
    let losers: Vec<String> = semifinals
        .iter()
        .filter_map(|m| m.loser().map(String::from))
        .collect();
    if let [first, second, ..] = losers.as_slice() {
        let id = ensure_round(tournament, RoundKind::ThirdPlace);
        tournament.matches.push(GameMatch::new(
            id,
            RoundKind::ThirdPlace,
            1,
            first.clone(),
            Some(second.clone()),
        ));
    } else {
        log::info!(
            "Tournament {}: no 3rd place match ({} semifinal loser(s))",
            tournament.id,
            losers.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn odd_winner_is_dropped_without_bye() {
        let pairs = pair_winners(&names(&["A", "B", "C"]), OddWinnerPolicy::Drop);
        assert_eq!(pairs, vec![("A".to_string(), Some("B".to_string()))]);
    }

    #[test]
    fn odd_winner_can_carry_as_bye() {
        let pairs = pair_winners(&names(&["A", "B", "C"]), OddWinnerPolicy::CarryAsBye);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("C".to_string(), None));
    }

    #[test]
    fn default_policy_drops() {
        assert_eq!(ODD_WINNER_POLICY, OddWinnerPolicy::Drop);
    }
}
