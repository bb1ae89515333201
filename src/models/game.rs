//! Match between two participants (or a bye) inside a round.

use crate::models::round::{RoundId, RoundKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Match code: round prefix + 1-based, zero-padded sequence (`R16-M03`).
pub fn match_code(kind: RoundKind, seq: usize) -> String {
    format!("{}-M{:02}", kind.code_prefix(), seq)
}

/// A single match. `player2 == None` marks a bye.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round_id: RoundId,
    pub code: String,
    /// 1-based position inside the round; winners advance in this order.
    pub seq: usize,
    pub player1: String,
    pub player2: Option<String>,
    /// None if not yet played.
    pub winner: Option<String>,
    pub score: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub judge: Option<String>,
    pub court: Option<String>,
}

impl GameMatch {
    pub fn new(
        round_id: RoundId,
        kind: RoundKind,
        seq: usize,
        player1: impl Into<String>,
        player2: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_id,
            code: match_code(kind, seq),
            seq,
            player1: player1.into(),
            player2,
            winner: None,
            score: None,
            is_completed: false,
            completed_at: None,
            judge: None,
            court: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    /// True if `name` occupies one of the two slots.
    pub fn has_participant(&self, name: &str) -> bool {
        self.player1 == name || self.player2.as_deref() == Some(name)
    }

    /// The participant who did not win. None for byes and undecided matches.
    pub fn loser(&self) -> Option<&str> {
        let winner = self.winner.as_deref()?;
        let player2 = self.player2.as_deref()?;
        if winner == self.player1 {
            Some(player2)
        } else if winner == player2 {
            Some(&self.player1)
        } else {
            None
        }
    }

    /// Record the outcome. Caller validates the winner.
    pub fn complete(&mut self, winner: &str, score: Option<String>) {
        self.winner = Some(winner.to_string());
        self.score = score;
        self.is_completed = true;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_zero_padded() {
        assert_eq!(match_code(RoundKind::RoundOf16, 3), "R16-M03");
        assert_eq!(match_code(RoundKind::ThirdPlace, 1), "3P-M01");
        assert_eq!(match_code(RoundKind::RoundOf32, 16), "R32-M16");
    }

    #[test]
    fn loser_is_the_other_slot() {
        let mut m = GameMatch::new(Uuid::new_v4(), RoundKind::Semifinal, 1, "A", Some("B".into()));
        assert_eq!(m.loser(), None);
        m.complete("B", Some("3-1".into()));
        assert_eq!(m.loser(), Some("A"));

        let mut bye = GameMatch::new(Uuid::new_v4(), RoundKind::Semifinal, 2, "C", None);
        bye.complete("C", None);
        assert!(bye.is_bye());
        assert_eq!(bye.loser(), None);
    }
}
