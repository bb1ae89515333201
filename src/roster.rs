//! Roster provider: the confirmed participants a bracket is built from.

use crate::models::{Participant, TournamentId};
use std::collections::HashMap;
use std::io::Read;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Participant name must not be empty")]
    EmptyName,
    /// Names are unique per tournament (case-insensitive): slots and winners refer to them.
    #[error("A participant named {0} already exists")]
    DuplicateName(String),
    #[error("Tournament is full ({current} of {max} places taken)")]
    Full { max: usize, current: usize },
    #[error("CSV roster needs a 'name' column")]
    MissingNameColumn,
    #[error("CSV roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("Roster lock poisoned")]
    Poisoned,
}

/// Supplies the confirmed participants of a tournament, in registration order.
pub trait RosterProvider: Send + Sync {
    fn participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, RosterError>;
}

/// Read participant names from CSV with a header row containing `name`.
/// Blank names are skipped.
pub fn read_csv_names<R: Read>(reader: R) -> Result<Vec<String>, RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let idx = rdr
        .headers()?
        .iter()
        .position(|h| h.eq_ignore_ascii_case("name"))
        .ok_or(RosterError::MissingNameColumn)?;
    let mut names = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(name) = record.get(idx).filter(|n| !n.is_empty()) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[derive(Debug, Default)]
struct RosterEntry {
    /// Most participants the tournament accepts. `None` means unlimited.
    capacity: Option<usize>,
    participants: Vec<Participant>,
}

/// In-memory registry of participants per tournament.
#[derive(Debug, Default)]
pub struct Roster {
    entries: RwLock<HashMap<TournamentId, RosterEntry>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit registrations for a tournament. Participants already registered stay.
    pub fn set_capacity(&self, tournament_id: TournamentId, max: usize) -> Result<(), RosterError> {
        let mut g = self.entries.write().map_err(|_| RosterError::Poisoned)?;
        g.entry(tournament_id).or_default().capacity = Some(max);
        Ok(())
    }

    /// Register one participant.
    pub fn register(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> Result<Participant, RosterError> {
        let mut added = self.register_all(tournament_id, &[name])?;
        added.pop().ok_or(RosterError::EmptyName)
    }

    /// Register several participants; nothing is added if any name is rejected
    /// or the batch does not fit the remaining capacity.
    pub fn register_all<S: AsRef<str>>(
        &self,
        tournament_id: TournamentId,
        names: &[S],
    ) -> Result<Vec<Participant>, RosterError> {
        let mut g = self.entries.write().map_err(|_| RosterError::Poisoned)?;
        let entry = g.entry(tournament_id).or_default();
        let current = entry.participants.len();
        if let Some(max) = entry.capacity.filter(|&max| current + names.len() > max) {
            return Err(RosterError::Full { max, current });
        }
        let existing = &mut entry.participants;
        let mut added: Vec<Participant> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(RosterError::EmptyName);
            }
            let is_duplicate = existing
                .iter()
                .chain(added.iter())
                .any(|p| p.name.eq_ignore_ascii_case(name));
            if is_duplicate {
                return Err(RosterError::DuplicateName(name.to_string()));
            }
            added.push(Participant::new(name));
        }
        existing.extend(added.iter().cloned());
        Ok(added)
    }

    /// Register every name from a CSV roster.
    pub fn import_csv<R: Read>(
        &self,
        tournament_id: TournamentId,
        reader: R,
    ) -> Result<Vec<Participant>, RosterError> {
        let names = read_csv_names(reader)?;
        self.register_all(tournament_id, &names)
    }
}

impl RosterProvider for Roster {
    fn participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, RosterError> {
        let g = self.entries.read().map_err(|_| RosterError::Poisoned)?;
        Ok(g
            .get(&tournament_id)
            .map(|e| e.participants.clone())
            .unwrap_or_default())
    }
}
