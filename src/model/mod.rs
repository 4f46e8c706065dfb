pub mod heroes;
pub mod match_record;
pub mod types;
pub mod validation;

pub use match_record::{MatchId, MatchPatch, MatchRecord, NewMatch};
pub use types::{Difficulty, GameResult, Mood, Role};
