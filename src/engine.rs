//! Tournament store with per-tournament locking, and the bracket operations on top of it.

use crate::audit::{self, AuditEvent, AuditSink};
use crate::logic;
use crate::models::{
    AdvanceSummary, BracketView, InitializeSummary, MatchId, RecordSummary, Tournament,
    TournamentError, TournamentId, TournamentStatus, COMPLETED_LABEL,
};
use crate::roster::RosterProvider;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

type Entry = Arc<Mutex<Tournament>>;

/// Owns every tournament's rounds and matches.
///
/// Each tournament sits behind its own mutex, so all operations on one tournament
/// are serialized while different tournaments proceed in parallel.
pub struct BracketEngine {
    tournaments: RwLock<HashMap<TournamentId, Entry>>,
    /// Which tournament each match belongs to.
    match_index: RwLock<HashMap<MatchId, TournamentId>>,
    roster: Arc<dyn RosterProvider>,
    audit: Arc<dyn AuditSink>,
}

impl BracketEngine {
    pub fn new(roster: Arc<dyn RosterProvider>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            tournaments: RwLock::new(HashMap::new()),
            match_index: RwLock::new(HashMap::new()),
            roster,
            audit,
        }
    }

    /// Register a new tournament in Pending state.
    pub fn create_tournament(&self, max_participants: u32) -> Result<BracketView, TournamentError> {
        let tournament = Tournament::new(max_participants);
        let view = BracketView::from(&tournament);
        self.tournaments
            .write()
            .map_err(|_| TournamentError::LockPoisoned)?
            .insert(tournament.id, Arc::new(Mutex::new(tournament)));
        log::info!("Tournament {} created (max {} participants)", view.id, max_participants);
        Ok(view)
    }

    fn entry(&self, id: TournamentId) -> Result<Entry, TournamentError> {
        self.tournaments
            .read()
            .map_err(|_| TournamentError::LockPoisoned)?
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn lock(entry: &Entry) -> Result<MutexGuard<'_, Tournament>, TournamentError> {
        entry.lock().map_err(|_| TournamentError::LockPoisoned)
    }

    fn tournament_of(&self, match_id: MatchId) -> Result<TournamentId, TournamentError> {
        self.match_index
            .read()
            .map_err(|_| TournamentError::LockPoisoned)?
            .get(&match_id)
            .copied()
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    /// Index every match of `tournament` that the index does not know yet.
    fn index_matches(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        let mut index = self
            .match_index
            .write()
            .map_err(|_| TournamentError::LockPoisoned)?;
        for m in &tournament.matches {
            index.entry(m.id).or_insert(tournament.id);
        }
        Ok(())
    }

    /// Snapshot of a tournament.
    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let entry = self.entry(id)?;
        let t = Self::lock(&entry)?;
        Ok(t.clone())
    }

    /// Read model for display.
    pub fn view(&self, id: TournamentId) -> Result<BracketView, TournamentError> {
        let entry = self.entry(id)?;
        let t = Self::lock(&entry)?;
        Ok(BracketView::from(&*t))
    }

    /// Build (or rebuild) the bracket from the roster, with a random shuffle.
    pub fn initialize(&self, id: TournamentId, actor: &str) -> Result<InitializeSummary, TournamentError> {
        self.initialize_with_rng(id, actor, &mut rand::thread_rng())
    }

    /// Build (or rebuild) the bracket from the roster, shuffling with `rng`.
    pub fn initialize_with_rng<R: Rng + ?Sized>(
        &self,
        id: TournamentId,
        actor: &str,
        rng: &mut R,
    ) -> Result<InitializeSummary, TournamentError> {
        let entry = self.entry(id)?;
        let participants = self.roster.participants(id)?;
        let mut t = Self::lock(&entry)?;

        let stale: Vec<MatchId> = t.matches.iter().map(|m| m.id).collect();
        let summary = logic::build_bracket(&mut t, &participants, rng)?;
        {
            let mut index = self
                .match_index
                .write()
                .map_err(|_| TournamentError::LockPoisoned)?;
            for match_id in stale {
                index.remove(&match_id);
            }
        }
        self.index_matches(&t)?;

        audit::emit(
            self.audit.as_ref(),
            AuditEvent::BracketInitialized {
                tournament_id: id,
                participants: summary.total_participants,
                rounds_created: summary.rounds_created,
                actor: actor.to_string(),
            },
        );
        Ok(summary)
    }

    /// Record the outcome of one match.
    pub fn record_result(
        &self,
        match_id: MatchId,
        winner: &str,
        score: Option<&str>,
        actor: &str,
    ) -> Result<RecordSummary, TournamentError> {
        let id = self.tournament_of(match_id)?;
        let entry = self.entry(id)?;
        let mut t = Self::lock(&entry)?;

        let was_completed = t.status == TournamentStatus::Completed;
        let summary = logic::record_result(&mut t, match_id, winner, score, actor)?;
        if !was_completed && t.status == TournamentStatus::Completed {
            self.emit_completed(id, actor);
        }
        Ok(summary)
    }

    /// Close `round_name` and build the next round.
    pub fn advance_round(
        &self,
        id: TournamentId,
        round_name: &str,
        actor: &str,
    ) -> Result<AdvanceSummary, TournamentError> {
        let entry = self.entry(id)?;
        let mut t = Self::lock(&entry)?;

        let was_completed = t.status == TournamentStatus::Completed;
        let summary = logic::advance_round(&mut t, round_name, actor)?;
        self.index_matches(&t)?;

        audit::emit(
            self.audit.as_ref(),
            AuditEvent::RoundAdvanced {
                tournament_id: id,
                from_round: summary.from_round.clone(),
                to_round: summary.to_round.clone(),
                completed_matches: summary.completed_matches,
                actor: actor.to_string(),
            },
        );
        if !was_completed && summary.to_round == COMPLETED_LABEL {
            self.emit_completed(id, actor);
        }
        Ok(summary)
    }

    /// Assign a judge and/or court to a match. Has no effect on progression.
    pub fn assign(
        &self,
        match_id: MatchId,
        judge: Option<&str>,
        court: Option<&str>,
    ) -> Result<BracketView, TournamentError> {
        let id = self.tournament_of(match_id)?;
        let entry = self.entry(id)?;
        let mut t = Self::lock(&entry)?;
        let m = t
            .get_match_mut(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if let Some(judge) = judge {
            m.judge = Some(judge.trim().to_string()).filter(|j| !j.is_empty());
        }
        if let Some(court) = court {
            m.court = Some(court.trim().to_string()).filter(|c| !c.is_empty());
        }
        t.touch();
        Ok(BracketView::from(&*t))
    }

    /// Cancel a tournament that has not completed.
    pub fn cancel(&self, id: TournamentId) -> Result<BracketView, TournamentError> {
        let entry = self.entry(id)?;
        let mut t = Self::lock(&entry)?;
        t.cancel()?;
        log::info!("Tournament {} cancelled", id);
        Ok(BracketView::from(&*t))
    }

    fn emit_completed(&self, id: TournamentId, actor: &str) {
        audit::emit(
            self.audit.as_ref(),
            AuditEvent::TournamentCompleted {
                tournament_id: id,
                actor: actor.to_string(),
            },
        );
    }
}
