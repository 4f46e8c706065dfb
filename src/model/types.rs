use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        ParseEnumError {
            kind,
            value: value.to_string(),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

/// Position played, 1 (carry) through 5 (hard support).
///
/// Stored as its number so that documents stay compatible with the
/// `role: 1..5` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Carry = 1,
    Mid = 2,
    Offlane = 3,
    SoftSupport = 4,
    HardSupport = 5,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Carry,
        Role::Mid,
        Role::Offlane,
        Role::SoftSupport,
        Role::HardSupport,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Carry => "Carry",
            Role::Mid => "Mid",
            Role::Offlane => "Offlane",
            Role::SoftSupport => "Soft Support",
            Role::HardSupport => "Hard Support",
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = ParseEnumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Role::ALL
            .into_iter()
            .find(|r| r.number() == value)
            .ok_or_else(|| ParseEnumError::new("role", &value.to_string()))
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.number()
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.trim().parse::<u8>() {
            return Role::try_from(n);
        }
        let wanted = normalize(s);
        Role::ALL
            .into_iter()
            .find(|r| normalize(r.label()) == wanted)
            .ok_or_else(|| ParseEnumError::new("role", s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.number())
    }
}

/// Five-point self assessment, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Terrible,
    Bad,
    Neutral,
    Good,
    Great,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Terrible, Mood::Bad, Mood::Neutral, Mood::Good, Mood::Great];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Terrible => "terrible",
            Mood::Bad => "bad",
            Mood::Neutral => "neutral",
            Mood::Good => "good",
            Mood::Great => "great",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Terrible => "Terrible",
            Mood::Bad => "Bad",
            Mood::Neutral => "Neutral",
            Mood::Good => "Good",
            Mood::Great => "Great",
        }
    }
}

impl FromStr for Mood {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ParseEnumError::new("mood", s))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Subjective difficulty of a game.
///
/// Older documents only know `easy`, `impossible` and `self-impact`; those map
/// onto the variants of the same name. The snake/camel spellings of
/// `self-impact` are accepted as aliases. Any other label is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    Even,
    Hard,
    Impossible,
    #[serde(alias = "self_impact", alias = "selfImpact")]
    SelfImpact,
    Free,
}

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Easy,
        Difficulty::Even,
        Difficulty::Hard,
        Difficulty::Impossible,
        Difficulty::SelfImpact,
        Difficulty::Free,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Even => "even",
            Difficulty::Hard => "hard",
            Difficulty::Impossible => "impossible",
            Difficulty::SelfImpact => "self-impact",
            Difficulty::Free => "free",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy game",
            Difficulty::Even => "Even game",
            Difficulty::Hard => "Hard game",
            Difficulty::Impossible => "Impossible to win",
            Difficulty::SelfImpact => "Self impact",
            Difficulty::Free => "Free win",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        let wanted = if wanted == "selfimpact" {
            "self-impact".to_string()
        } else {
            wanted
        };
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| ParseEnumError::new("difficulty", s))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn is_win(self) -> bool {
        self == GameResult::Win
    }
}

impl FromStr for GameResult {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "win" | "w" => Ok(GameResult::Win),
            "loss" | "lose" | "l" => Ok(GameResult::Loss),
            _ => Err(ParseEnumError::new("result", s)),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win => f.write_str("WIN"),
            GameResult::Loss => f.write_str("LOSS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Role::Offlane).unwrap(), "3");
        let role: Role = serde_json::from_str("5").unwrap();
        assert_eq!(role, Role::HardSupport);
        assert!(serde_json::from_str::<Role>("6").is_err());
        assert!(serde_json::from_str::<Role>("0").is_err());
    }

    #[test]
    fn role_parses_number_or_label() {
        assert_eq!("1".parse::<Role>().unwrap(), Role::Carry);
        assert_eq!("soft support".parse::<Role>().unwrap(), Role::SoftSupport);
        assert_eq!("Hard_Support".parse::<Role>().unwrap(), Role::HardSupport);
        assert!("jungle".parse::<Role>().is_err());
    }

    #[test]
    fn moods_are_ordered_worst_to_best() {
        assert!(Mood::Terrible < Mood::Bad);
        assert!(Mood::Bad < Mood::Neutral);
        assert!(Mood::Neutral < Mood::Good);
        assert!(Mood::Good < Mood::Great);
        assert_eq!("GREAT".parse::<Mood>().unwrap(), Mood::Great);
    }

    #[test]
    fn legacy_difficulty_labels_are_accepted() {
        for (raw, expected) in [
            ("\"easy\"", Difficulty::Easy),
            ("\"impossible\"", Difficulty::Impossible),
            ("\"self-impact\"", Difficulty::SelfImpact),
            ("\"self_impact\"", Difficulty::SelfImpact),
            ("\"selfImpact\"", Difficulty::SelfImpact),
        ] {
            let parsed: Difficulty = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected, "{}", raw);
        }
        assert!(serde_json::from_str::<Difficulty>("\"normal\"").is_err());
    }

    #[test]
    fn difficulty_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Difficulty::SelfImpact).unwrap(),
            "\"self-impact\""
        );
        assert_eq!("Self Impact".parse::<Difficulty>().unwrap(), Difficulty::SelfImpact);
        assert_eq!("selfimpact".parse::<Difficulty>().unwrap(), Difficulty::SelfImpact);
    }

    #[test]
    fn result_parses_short_forms() {
        assert_eq!("W".parse::<GameResult>().unwrap(), GameResult::Win);
        assert_eq!("loss".parse::<GameResult>().unwrap(), GameResult::Loss);
        assert!("draw".parse::<GameResult>().is_err());
    }
}
