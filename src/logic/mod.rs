//! Bracket business logic: building, recording results, advancing rounds.

mod advance;
mod bracket;
mod completion;
mod results;

pub use advance::{advance_round, next_round_kind, pair_winners, OddWinnerPolicy, ODD_WINNER_POLICY};
pub use bracket::{build_bracket, pair_entrants};
pub use completion::{close_round_if_complete, complete_tournament, is_round_complete};
pub use results::record_result;
