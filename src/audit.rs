//! Best-effort audit trail of bracket transitions.

use crate::models::TournamentId;
use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("audit sink unavailable")]
    Unavailable,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    BracketInitialized {
        tournament_id: TournamentId,
        participants: usize,
        rounds_created: usize,
        actor: String,
    },
    RoundAdvanced {
        tournament_id: TournamentId,
        from_round: String,
        to_round: String,
        completed_matches: usize,
        actor: String,
    },
    TournamentCompleted {
        tournament_id: TournamentId,
        actor: String,
    },
}

/// Where audit records go. Failures never fail the operation that produced them.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes each event as one JSON line through the `log` facade.
#[derive(Debug, Default)]
pub struct LogAudit;

impl AuditSink for LogAudit {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let line = serde_json::to_string(event)?;
        log::info!(target: "audit", "{}", line);
        Ok(())
    }
}

/// Keeps events in memory (inspection and tests).
#[derive(Debug, Default)]
pub struct MemoryAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAudit {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .map_err(|_| AuditError::Unavailable)?
            .push(event.clone());
        Ok(())
    }
}

/// Record `event`, logging instead of propagating any failure.
pub(crate) fn emit(sink: &dyn AuditSink, event: AuditEvent) {
    if let Err(e) = sink.record(&event) {
        log::warn!("audit record dropped ({}): {:?}", e, event);
    }
}
