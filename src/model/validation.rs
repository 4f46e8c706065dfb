use super::heroes;
use super::match_record::{MatchPatch, NewMatch};
use super::types::{Difficulty, GameResult, Mood, Role};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Hero,
    Role,
    RatingChange,
    Difficulty,
    Result,
    MoodStart,
    MoodEnd,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Hero => "hero",
            Field::Role => "role",
            Field::RatingChange => "ratingChange",
            Field::Difficulty => "difficulty",
            Field::Result => "result",
            Field::MoodStart => "moodStart",
            Field::MoodEnd => "moodEnd",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Field::Hero => "Hero",
            Field::Role => "Role",
            Field::RatingChange => "Rating change",
            Field::Difficulty => "Game difficulty",
            Field::Result => "Result",
            Field::MoodStart => "Start mood",
            Field::MoodEnd => "End mood",
        }
    }
}

/// Field-keyed messages for a rejected draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: Field, message: String) {
        self.0.entry(field).or_insert(message);
    }

    fn missing(&mut self, field: Field) {
        self.insert(field, format!("{} is required", field.label()));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.key(), msg))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw match input as typed by the user. Nothing is trusted until `validate`.
#[derive(Debug, Clone, Default)]
pub struct MatchDraft {
    pub hero: Option<String>,
    pub role: Option<String>,
    pub rating_change: Option<i32>,
    pub difficulty: Option<String>,
    pub is_token_game: bool,
    pub result: Option<String>,
    pub mood_start: Option<String>,
    pub mood_end: Option<String>,
    pub comment: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_field<T: FromStr>(
    errors: &mut ValidationErrors,
    field: Field,
    raw: Option<&str>,
    invalid: impl FnOnce(&str) -> String,
) -> Option<T> {
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.insert(field, invalid(raw));
            None
        }
    }
}

fn parse_hero(errors: &mut ValidationErrors, raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    match heroes::canonical_name(raw) {
        Some(name) => Some(name.to_string()),
        None => {
            errors.insert(Field::Hero, format!("Unknown hero: {}", raw));
            None
        }
    }
}

impl MatchDraft {
    /// Fills in the result from the sign of the rating change when the user
    /// left it empty. A zero change, or an explicit result, is left alone.
    pub fn infer_result(&mut self) {
        if present(&self.result).is_some() {
            return;
        }
        match self.rating_change {
            Some(change) if change > 0 => self.result = Some("win".to_string()),
            Some(change) if change < 0 => self.result = Some("loss".to_string()),
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<NewMatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let hero = parse_hero(&mut errors, present(&self.hero));
        let role: Option<Role> = parse_field(&mut errors, Field::Role, present(&self.role), |_| {
            "Role must be between 1 and 5".to_string()
        });
        let difficulty: Option<Difficulty> =
            parse_field(&mut errors, Field::Difficulty, present(&self.difficulty), |raw| {
                format!("Unknown difficulty: {}", raw)
            });
        let result: Option<GameResult> =
            parse_field(&mut errors, Field::Result, present(&self.result), |raw| {
                format!("Result must be win or loss, got {}", raw)
            });
        let mood_start: Option<Mood> =
            parse_field(&mut errors, Field::MoodStart, present(&self.mood_start), |raw| {
                format!("Unknown mood: {}", raw)
            });
        let mood_end: Option<Mood> =
            parse_field(&mut errors, Field::MoodEnd, present(&self.mood_end), |raw| {
                format!("Unknown mood: {}", raw)
            });

        if hero.is_none() {
            errors.missing(Field::Hero);
        }
        if role.is_none() {
            errors.missing(Field::Role);
        }
        if self.rating_change.is_none() {
            errors.missing(Field::RatingChange);
        }
        if difficulty.is_none() {
            errors.missing(Field::Difficulty);
        }
        if result.is_none() {
            errors.missing(Field::Result);
        }
        if mood_start.is_none() {
            errors.missing(Field::MoodStart);
        }
        if mood_end.is_none() {
            errors.missing(Field::MoodEnd);
        }

        match (hero, role, self.rating_change, difficulty, result, mood_start, mood_end) {
            (
                Some(hero),
                Some(role),
                Some(rating_change),
                Some(difficulty),
                Some(result),
                Some(mood_start),
                Some(mood_end),
            ) if errors.is_empty() => Ok(NewMatch {
                hero,
                role,
                rating_change,
                difficulty,
                is_token_game: self.is_token_game,
                result,
                mood_start,
                mood_end,
                comment: present(&self.comment).map(str::to_string),
            }),
            _ => Err(errors),
        }
    }

    /// Parses only the fields that were supplied, for editing an existing record.
    /// A supplied but empty comment clears it. `is_token_game` is handled by the
    /// caller since a plain bool cannot say "unchanged".
    pub fn to_patch(&self) -> Result<MatchPatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let patch = MatchPatch {
            hero: parse_hero(&mut errors, present(&self.hero)),
            role: parse_field(&mut errors, Field::Role, present(&self.role), |_| {
                "Role must be between 1 and 5".to_string()
            }),
            rating_change: self.rating_change,
            difficulty: parse_field(&mut errors, Field::Difficulty, present(&self.difficulty), |raw| {
                format!("Unknown difficulty: {}", raw)
            }),
            is_token_game: None,
            result: parse_field(&mut errors, Field::Result, present(&self.result), |raw| {
                format!("Result must be win or loss, got {}", raw)
            }),
            mood_start: parse_field(&mut errors, Field::MoodStart, present(&self.mood_start), |raw| {
                format!("Unknown mood: {}", raw)
            }),
            mood_end: parse_field(&mut errors, Field::MoodEnd, present(&self.mood_end), |raw| {
                format!("Unknown mood: {}", raw)
            }),
            comment: self
                .comment
                .as_ref()
                .map(|c| Some(c.trim().to_string()).filter(|c| !c.is_empty())),
        };

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}
