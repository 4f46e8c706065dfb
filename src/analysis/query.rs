use crate::model::types::ParseEnumError;
use crate::model::{Difficulty, GameResult, MatchRecord, Role};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    RatingHigh,
    RatingLow,
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "rating-high" | "mmr-high" => Ok(SortOrder::RatingHigh),
            "rating-low" | "mmr-low" => Ok(SortOrder::RatingLow),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

/// Match list filters; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchQuery {
    pub hero: Option<String>,
    pub role: Option<Role>,
    pub difficulty: Option<Difficulty>,
    pub result: Option<GameResult>,
    pub token_only: bool,
    pub sort: SortOrder,
}

impl MatchQuery {
    pub fn matches(&self, m: &MatchRecord) -> bool {
        self.hero.as_ref().map_or(true, |h| &m.hero == h)
            && self.role.map_or(true, |r| m.role == r)
            && self.difficulty.map_or(true, |d| m.difficulty == d)
            && self.result.map_or(true, |r| m.result == r)
            && (!self.token_only || m.is_token_game)
    }

    /// Filtered copy in the requested order. Ties keep insertion order.
    pub fn apply(&self, records: &[MatchRecord]) -> Vec<MatchRecord> {
        let mut out: Vec<MatchRecord> = records.iter().filter(|m| self.matches(m)).cloned().collect();
        match self.sort {
            SortOrder::Newest => out.sort_by(|a, b| b.date.cmp(&a.date)),
            SortOrder::Oldest => out.sort_by(|a, b| a.date.cmp(&b.date)),
            SortOrder::RatingHigh => out.sort_by(|a, b| b.rating_change.cmp(&a.rating_change)),
            SortOrder::RatingLow => out.sort_by(|a, b| a.rating_change.cmp(&b.rating_change)),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::match_record::fixtures::{at, record};

    fn sample() -> Vec<MatchRecord> {
        let mut token = record("c", at(12, 0), "Axe", 40);
        token.is_token_game = true;
        token.difficulty = Difficulty::Hard;
        vec![
            record("a", at(10, 0), "Pudge", 25),
            record("b", at(11, 0), "Pudge", -20),
            token,
        ]
    }

    fn ids(records: &[MatchRecord]) -> Vec<&str> {
        records.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn default_query_lists_newest_first() {
        let out = MatchQuery::default().apply(&sample());
        assert_eq!(ids(&out), vec!["c", "b", "a"]);
    }

    #[test]
    fn filters_combine() {
        let records = sample();
        let pudge_wins = MatchQuery {
            hero: Some("Pudge".to_string()),
            result: Some(GameResult::Win),
            ..Default::default()
        };
        assert_eq!(ids(&pudge_wins.apply(&records)), vec!["a"]);

        let tokens = MatchQuery {
            token_only: true,
            ..Default::default()
        };
        assert_eq!(ids(&tokens.apply(&records)), vec!["c"]);

        let hard_mid = MatchQuery {
            difficulty: Some(Difficulty::Hard),
            role: Some(Role::Mid),
            ..Default::default()
        };
        assert!(hard_mid.apply(&records).is_empty());
    }

    #[test]
    fn sorts_by_rating_change() {
        let records = sample();
        let high = MatchQuery {
            sort: SortOrder::RatingHigh,
            ..Default::default()
        };
        assert_eq!(ids(&high.apply(&records)), vec!["c", "a", "b"]);

        let low = MatchQuery {
            sort: "mmr-low".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(ids(&low.apply(&records)), vec!["b", "a", "c"]);
    }

    #[test]
    fn input_is_not_mutated() {
        let records = sample();
        let before = records.clone();
        let _ = MatchQuery {
            sort: SortOrder::Oldest,
            ..Default::default()
        }
        .apply(&records);
        assert_eq!(records, before);
    }
}
