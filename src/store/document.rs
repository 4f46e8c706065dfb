use crate::error::AppError;
use crate::model::MatchRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Schema version written by this build.
///
/// * 0: unversioned, possibly wrapped as `{ "state": {...}, "version": n }`,
///   with `mmrChange` / `gameDifficulty` / `currentMMR` field names.
/// * 1: flat document with the legacy field names.
/// * 2: `ratingChange` / `difficulty` / `currentRating`.
pub const SCHEMA_VERSION: u32 = 2;

/// Persisted form of the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    #[serde(default, alias = "currentMMR")]
    pub current_rating: i64,
}

impl MatchesDocument {
    pub fn empty(current_rating: i64) -> Self {
        MatchesDocument {
            version: SCHEMA_VERSION,
            matches: Vec::new(),
            current_rating,
        }
    }

    pub fn parse(json: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| AppError::Import(format!("Malformed matches document: {}", e)))?;
        Self::from_value(value)
    }

    /// Reads any known schema version and upgrades it to the current one.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        let value = unwrap_persist_envelope(value);

        let mut doc: MatchesDocument = serde_json::from_value(value)
            .map_err(|e| AppError::Import(format!("Malformed matches document: {}", e)))?;

        if doc.version > SCHEMA_VERSION {
            return Err(AppError::Import(format!(
                "Matches document version {} is newer than supported version {}",
                doc.version, SCHEMA_VERSION
            )));
        }
        if doc.version < SCHEMA_VERSION {
            info!(
                from = doc.version,
                to = SCHEMA_VERSION,
                matches = doc.matches.len(),
                "migrated matches document"
            );
            doc.version = SCHEMA_VERSION;
        }

        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Json(format!("Failed to serialize matches: {}", e)))
    }
}

// Browser-era documents were stored inside a `{ state, version }` envelope.
fn unwrap_persist_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("matches") && map.contains_key("state") => {
            map.remove("state").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use assert_matches::assert_matches;

    #[test]
    fn upgrades_wrapped_legacy_document() {
        let json = r#"{
            "state": {
                "matches": [{
                    "id": "1",
                    "date": "2024-03-15T10:00:00.000Z",
                    "hero": "Axe",
                    "role": 3,
                    "mmrChange": -30,
                    "gameDifficulty": "impossible",
                    "isTokenGame": false,
                    "result": "loss",
                    "moodStart": "neutral",
                    "moodEnd": "terrible"
                }],
                "currentMMR": 2970
            },
            "version": 0
        }"#;

        let doc = MatchesDocument::parse(json).unwrap();
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert_eq!(doc.current_rating, 2970);
        assert_eq!(doc.matches.len(), 1);
        assert_eq!(doc.matches[0].rating_change, -30);
        assert_eq!(doc.matches[0].difficulty, Difficulty::Impossible);
    }

    #[test]
    fn current_document_round_trips() {
        let doc = MatchesDocument::empty(1500);
        let parsed = MatchesDocument::parse(&doc.to_json().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let json = r#"{
            "matches": [{
                "id": "1",
                "date": "2024-03-15T10:00:00Z",
                "hero": "Axe",
                "role": 3,
                "ratingChange": 30,
                "difficulty": "medium",
                "result": "win",
                "moodStart": "neutral",
                "moodEnd": "good"
            }],
            "currentRating": 30
        }"#;
        assert_matches!(MatchesDocument::parse(json), Err(AppError::Import(_)));
    }

    #[test]
    fn newer_schema_version_is_rejected() {
        let json = r#"{"version": 99, "matches": [], "currentRating": 0}"#;
        assert_matches!(
            MatchesDocument::parse(json),
            Err(AppError::Import(message)) if message.contains("99")
        );
    }

    #[test]
    fn garbage_is_an_import_error() {
        assert_matches!(MatchesDocument::parse("not json"), Err(AppError::Import(_)));
        assert_matches!(
            MatchesDocument::parse(r#"{"matches": "nope"}"#),
            Err(AppError::Import(_))
        );
    }
}
