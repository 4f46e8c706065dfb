use super::types::{Difficulty, GameResult, Mood, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn generate() -> Self {
        MatchId(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to tell records apart on screen.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId(s.to_string())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logged game. Only replaced through the record store, never edited in place
/// by anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub date: DateTime<Utc>,
    pub hero: String,
    pub role: Role,
    #[serde(alias = "mmrChange")]
    pub rating_change: i32,
    #[serde(alias = "gameDifficulty")]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub is_token_game: bool,
    pub result: GameResult,
    pub mood_start: Mood,
    pub mood_end: Mood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl MatchRecord {
    pub fn from_new(new: NewMatch, id: MatchId, date: DateTime<Utc>) -> Self {
        MatchRecord {
            id,
            date,
            hero: new.hero,
            role: new.role,
            rating_change: new.rating_change,
            difficulty: new.difficulty,
            is_token_game: new.is_token_game,
            result: new.result,
            mood_start: new.mood_start,
            mood_end: new.mood_end,
            comment: new.comment,
        }
    }
}

/// A validated match that has not been assigned an id or a date yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub hero: String,
    pub role: Role,
    pub rating_change: i32,
    pub difficulty: Difficulty,
    pub is_token_game: bool,
    pub result: GameResult,
    pub mood_start: Mood,
    pub mood_end: Mood,
    pub comment: Option<String>,
}

/// Fields to overwrite on an existing record; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchPatch {
    pub hero: Option<String>,
    pub role: Option<Role>,
    pub rating_change: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub is_token_game: Option<bool>,
    pub result: Option<GameResult>,
    pub mood_start: Option<Mood>,
    pub mood_end: Option<Mood>,
    /// `Some(None)` clears the comment.
    pub comment: Option<Option<String>>,
}

impl MatchPatch {
    pub fn is_empty(&self) -> bool {
        *self == MatchPatch::default()
    }

    /// Merges the patch into `record` and returns the change in rating it causes.
    pub fn apply(self, record: &mut MatchRecord) -> i64 {
        let before = record.rating_change;

        if let Some(hero) = self.hero {
            record.hero = hero;
        }
        if let Some(role) = self.role {
            record.role = role;
        }
        if let Some(change) = self.rating_change {
            record.rating_change = change;
        }
        if let Some(difficulty) = self.difficulty {
            record.difficulty = difficulty;
        }
        if let Some(token) = self.is_token_game {
            record.is_token_game = token;
        }
        if let Some(result) = self.result {
            record.result = result;
        }
        if let Some(mood) = self.mood_start {
            record.mood_start = mood;
        }
        if let Some(mood) = self.mood_end {
            record.mood_end = mood;
        }
        if let Some(comment) = self.comment {
            record.comment = comment;
        }

        i64::from(record.rating_change) - i64::from(before)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, minute, 0).unwrap()
    }

    pub fn new_match(hero: &str, change: i32) -> NewMatch {
        NewMatch {
            hero: hero.to_string(),
            role: Role::Carry,
            rating_change: change,
            difficulty: Difficulty::Even,
            is_token_game: false,
            result: if change >= 0 { GameResult::Win } else { GameResult::Loss },
            mood_start: Mood::Neutral,
            mood_end: if change >= 0 { Mood::Good } else { Mood::Bad },
            comment: None,
        }
    }

    pub fn record(id: &str, date: DateTime<Utc>, hero: &str, change: i32) -> MatchRecord {
        MatchRecord::from_new(new_match(hero, change), MatchId::from(id), date)
    }
}
