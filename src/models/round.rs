//! Round kinds, the progression table between them, and the Round record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// Stage of the knockout bracket. The display label is derived from the kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    RoundOf32,
    RoundOf16,
    Quarterfinal,
    Semifinal,
    Final,
    ThirdPlace,
}

impl RoundKind {
    /// Kinds in the order their shells are created at initialization
    /// (after the first round, which always comes first).
    pub const SHELLS: [RoundKind; 5] = [
        RoundKind::RoundOf16,
        RoundKind::Quarterfinal,
        RoundKind::Semifinal,
        RoundKind::Final,
        RoundKind::ThirdPlace,
    ];

    /// First round for `n` participants, by fixed thresholds (not log2).
    ///
    /// Two participants or fewer open directly with the Final.
    pub fn first_for(n: usize) -> Self {
        if n > 16 {
            RoundKind::RoundOf32
        } else if n > 8 {
            RoundKind::RoundOf16
        } else if n > 4 {
            RoundKind::Quarterfinal
        } else if n > 2 {
            RoundKind::Semifinal
        } else {
            RoundKind::Final
        }
    }

    /// Display label, e.g. "Quarterfinal".
    pub fn label(self) -> &'static str {
        match self {
            RoundKind::RoundOf32 => "Round of 32",
            RoundKind::RoundOf16 => "Round of 16",
            RoundKind::Quarterfinal => "Quarterfinal",
            RoundKind::Semifinal => "Semifinal",
            RoundKind::Final => "Final",
            RoundKind::ThirdPlace => "3rd Place Match",
        }
    }

    /// Parse a display label back into a kind.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        [
            RoundKind::RoundOf32,
            RoundKind::RoundOf16,
            RoundKind::Quarterfinal,
            RoundKind::Semifinal,
            RoundKind::Final,
            RoundKind::ThirdPlace,
        ]
        .into_iter()
        .find(|k| k.label().eq_ignore_ascii_case(label))
    }

    /// Prefix used in match codes (`QF-M01`).
    pub fn code_prefix(self) -> &'static str {
        match self {
            RoundKind::RoundOf32 => "R32",
            RoundKind::RoundOf16 => "R16",
            RoundKind::Quarterfinal => "QF",
            RoundKind::Semifinal => "SF",
            RoundKind::Final => "F",
            RoundKind::ThirdPlace => "3P",
        }
    }

    /// Fixed ordinal of the round shell. The Final (6) sorts after the 3rd place match (5).
    pub fn order(self) -> u32 {
        match self {
            RoundKind::RoundOf32 => 1,
            RoundKind::RoundOf16 => 2,
            RoundKind::Quarterfinal => 3,
            RoundKind::Semifinal => 4,
            RoundKind::ThirdPlace => 5,
            RoundKind::Final => 6,
        }
    }

    /// Most matches a round of this kind can hold.
    pub fn max_matches(self) -> u32 {
        match self {
            RoundKind::RoundOf32 => 16,
            RoundKind::RoundOf16 => 8,
            RoundKind::Quarterfinal => 4,
            RoundKind::Semifinal => 2,
            RoundKind::Final | RoundKind::ThirdPlace => 1,
        }
    }

    /// Progression table. `None` for terminal rounds.
    pub fn next(self) -> Option<Self> {
        match self {
            RoundKind::RoundOf32 => Some(RoundKind::RoundOf16),
            RoundKind::RoundOf16 => Some(RoundKind::Quarterfinal),
            RoundKind::Quarterfinal => Some(RoundKind::Semifinal),
            RoundKind::Semifinal => Some(RoundKind::Final),
            RoundKind::Final | RoundKind::ThirdPlace => None,
        }
    }

    /// "Round of N" labels are sized by participant count rather than named stages.
    pub fn is_sized(self) -> bool {
        matches!(self, RoundKind::RoundOf32 | RoundKind::RoundOf16)
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One round of a tournament. Matches refer to it by `id`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub kind: RoundKind,
    pub name: String,
    pub order: u32,
    /// Expected maximum match count.
    pub max_matches: u32,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Operator who closed the round.
    pub completed_by: Option<String>,
    /// Set once the round has been advanced past. Unlike `is_completed`,
    /// recording the last result does not set it.
    #[serde(default)]
    pub advanced: bool,
}

impl Round {
    /// Shell for `kind` with an explicit ordinal and match budget.
    pub fn new(kind: RoundKind, order: u32, max_matches: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: kind.label().to_string(),
            order,
            max_matches,
            is_completed: false,
            completed_at: None,
            completed_by: None,
            advanced: false,
        }
    }

    /// Flip the completed flag false -> true. Returns false if it was already set,
    /// leaving the original timestamp and operator untouched.
    pub fn mark_completed(&mut self, by: &str) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        self.completed_at = Some(Utc::now());
        self.completed_by = Some(by.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_pick_first_round() {
        assert_eq!(RoundKind::first_for(1), RoundKind::Final);
        assert_eq!(RoundKind::first_for(2), RoundKind::Final);
        assert_eq!(RoundKind::first_for(3), RoundKind::Semifinal);
        assert_eq!(RoundKind::first_for(4), RoundKind::Semifinal);
        assert_eq!(RoundKind::first_for(5), RoundKind::Quarterfinal);
        assert_eq!(RoundKind::first_for(8), RoundKind::Quarterfinal);
        assert_eq!(RoundKind::first_for(9), RoundKind::RoundOf16);
        assert_eq!(RoundKind::first_for(16), RoundKind::RoundOf16);
        assert_eq!(RoundKind::first_for(17), RoundKind::RoundOf32);
        assert_eq!(RoundKind::first_for(100), RoundKind::RoundOf32);
    }

    #[test]
    fn labels_round_trip() {
        for kind in [RoundKind::RoundOf32]
            .into_iter()
            .chain(RoundKind::SHELLS)
        {
            assert_eq!(RoundKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(RoundKind::from_label("quarterfinal"), Some(RoundKind::Quarterfinal));
        assert_eq!(RoundKind::from_label("Round of 64"), None);
    }

    #[test]
    fn third_place_sorts_before_final() {
        assert!(RoundKind::ThirdPlace.order() < RoundKind::Final.order());
        assert_eq!(RoundKind::Final.next(), None);
        assert_eq!(RoundKind::ThirdPlace.next(), None);
    }

    #[test]
    fn mark_completed_only_once() {
        let mut round = Round::new(RoundKind::Semifinal, 4, 2);
        assert!(round.mark_completed("alice"));
        let at = round.completed_at;
        assert!(!round.mark_completed("bob"));
        assert_eq!(round.completed_by.as_deref(), Some("alice"));
        assert_eq!(round.completed_at, at);
    }
}
