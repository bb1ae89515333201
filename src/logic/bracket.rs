//! Bracket construction: round shells and first-round pairings.

use crate::models::{
    GameMatch, InitializeSummary, Participant, Round, RoundKind, Tournament, TournamentError,
    TournamentStatus,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Pair entrants consecutively: (0,1), (2,3), ... A lone last entrant gets a bye (`None`).
pub fn pair_entrants(entrants: &[String]) -> Vec<(String, Option<String>)> {
    entrants
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair.get(1).cloned()))
        .collect()
}

/// Build a fresh bracket for `participants`, discarding any previous rounds and matches.
///
/// 1. Pick the first round from the participant count (fixed thresholds).
/// 2. Create the round shells: first round at ordinal 1, then Round of 16,
///    Quarterfinal, Semifinal, Final (6) and 3rd Place Match (5), skipping the
///    kind already used as the first round.
/// 3. Shuffle, then pair up to two entrants per first-round match slot.
pub fn build_bracket<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    participants: &[Participant],
    rng: &mut R,
) -> Result<InitializeSummary, TournamentError> {
    if tournament.status == TournamentStatus::Cancelled {
        return Err(TournamentError::InvalidState);
    }
    if participants.is_empty() {
        return Err(TournamentError::NoParticipants);
    }

    let n = participants.len();
    let first = RoundKind::first_for(n);
    let first_matches = first.max_matches() as usize;

    tournament.clear_bracket();
    let first_round = Round::new(first, 1, first.max_matches());
    let first_round_id = first_round.id;
    tournament.rounds.push(first_round);
    for kind in RoundKind::SHELLS.into_iter().filter(|k| *k != first) {
        tournament
            .rounds
            .push(Round::new(kind, kind.order(), kind.max_matches()));
    }

    let mut names: Vec<String> = participants.iter().map(|p| p.name.clone()).collect();
    names.shuffle(rng);

    let seated = n.min(first_matches * 2);
    if seated < n {
        log::warn!(
            "Tournament {}: {} participant(s) exceed the {} slots of the {} and get no match",
            tournament.id,
            n - seated,
            first_matches * 2,
            first
        );
    }

    let matches: Vec<GameMatch> = pair_entrants(&names[..seated])
        .into_iter()
        .enumerate()
        .map(|(i, (p1, p2))| GameMatch::new(first_round_id, first, i + 1, p1, p2))
        .collect();
    let byes = matches.iter().filter(|m| m.is_bye()).count();
    tournament.matches = matches;

    tournament.participant_count = n;
    tournament.current_round = Some(first_round_id);
    tournament.status = TournamentStatus::Active;
    tournament.touch();

    log::info!(
        "Tournament {}: bracket built for {} participants, first round {} ({} matches, {} bye)",
        tournament.id,
        n,
        first,
        tournament.matches.len(),
        byes
    );

    Ok(InitializeSummary {
        total_participants: n,
        rounds_created: tournament.rounds.len(),
    })
}
