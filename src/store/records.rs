use super::document::MatchesDocument;
use super::kv::KeyValueStore;
use crate::error::AppError;
use crate::model::{MatchId, MatchPatch, MatchRecord, NewMatch};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub const MATCHES_KEY: &str = "matches";

/// Owns the match list and the running rating.
///
/// The running rating always equals the rating baseline plus the sum of
/// `rating_change` over the current records; every mutation adjusts it by
/// exactly the delta it introduces. Each mutation is persisted right away.
#[derive(Debug)]
pub struct RecordStore<S: KeyValueStore> {
    storage: S,
    matches: Vec<MatchRecord>,
    current_rating: i64,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Loads the persisted document, or starts empty at `initial_rating` when
    /// none exists yet.
    pub fn open(storage: S, initial_rating: i64) -> Result<Self, AppError> {
        let doc = match storage.load(MATCHES_KEY)? {
            Some(json) => MatchesDocument::parse(&json).map_err(|e| e.stored(MATCHES_KEY))?,
            None => {
                debug!(initial_rating, "no stored matches, starting fresh");
                MatchesDocument::empty(initial_rating)
            }
        };

        Ok(RecordStore {
            storage,
            matches: doc.matches,
            current_rating: doc.current_rating,
        })
    }

    /// Empty store that ignores whatever `storage` holds. The stored document
    /// is only overwritten by the next mutation.
    pub fn fresh(storage: S, initial_rating: i64) -> Self {
        RecordStore {
            storage,
            matches: Vec::new(),
            current_rating: initial_rating,
        }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_rating(&self) -> i64 {
        self.current_rating
    }

    /// Rating before the first tracked game.
    pub fn baseline(&self) -> i64 {
        self.current_rating - total_change(&self.matches)
    }

    pub fn get(&self, id: &MatchId) -> Option<&MatchRecord> {
        self.matches.iter().find(|m| &m.id == id)
    }

    /// Most recent record by date; the later insertion wins a tie.
    pub fn last_record(&self) -> Option<&MatchRecord> {
        self.matches.iter().max_by_key(|m| m.date)
    }

    /// Resolves a full id or a unique prefix of one.
    pub fn resolve(&self, prefix: &str) -> Result<MatchId, AppError> {
        let prefix = prefix.trim();
        if let Some(m) = self.matches.iter().find(|m| m.id.as_str() == prefix) {
            return Ok(m.id.clone());
        }

        let mut found = self
            .matches
            .iter()
            .filter(|m| !prefix.is_empty() && m.id.as_str().starts_with(prefix));
        match (found.next(), found.next()) {
            (Some(m), None) => Ok(m.id.clone()),
            (Some(_), Some(_)) => Err(AppError::AmbiguousId(prefix.to_string())),
            _ => Err(AppError::MatchNotFound(prefix.to_string())),
        }
    }

    pub fn add(&mut self, new: NewMatch) -> MatchId {
        self.add_at(new, Utc::now())
    }

    pub fn add_at(&mut self, new: NewMatch, date: DateTime<Utc>) -> MatchId {
        let record = MatchRecord::from_new(new, MatchId::generate(), date);
        let id = record.id.clone();

        self.current_rating += i64::from(record.rating_change);
        debug!(id = %id, hero = %record.hero, change = record.rating_change, "added match");
        self.matches.push(record);
        self.persist();

        id
    }

    /// No-op when `id` is unknown.
    pub fn update(&mut self, id: &MatchId, patch: MatchPatch) {
        let Some(record) = self.matches.iter_mut().find(|m| &m.id == id) else {
            debug!(id = %id, "update ignored, no such match");
            return;
        };

        let delta = patch.apply(record);
        self.current_rating += delta;
        debug!(id = %id, delta, "updated match");
        self.persist();
    }

    /// No-op when `id` is unknown.
    pub fn remove(&mut self, id: &MatchId) {
        let Some(pos) = self.matches.iter().position(|m| &m.id == id) else {
            debug!(id = %id, "remove ignored, no such match");
            return;
        };

        let removed = self.matches.remove(pos);
        self.current_rating -= i64::from(removed.rating_change);
        debug!(id = %id, change = removed.rating_change, "removed match");
        self.persist();
    }

    /// Overwrites the running rating, e.g. to correct it by hand.
    pub fn set_baseline(&mut self, rating: i64) {
        debug!(from = self.current_rating, to = rating, "rating set manually");
        self.current_rating = rating;
        self.persist();
    }

    /// Replaces the whole state, as an import does.
    pub fn replace(&mut self, doc: MatchesDocument) {
        self.matches = doc.matches;
        self.current_rating = doc.current_rating;
        self.persist();
    }

    pub fn to_document(&self) -> MatchesDocument {
        MatchesDocument {
            matches: self.matches.clone(),
            ..MatchesDocument::empty(self.current_rating)
        }
    }

    // Write failures stay with the storage layer; the in-memory state is
    // already updated and remains authoritative for this session.
    fn persist(&mut self) {
        let result = self
            .to_document()
            .to_json()
            .and_then(|json| self.storage.save(MATCHES_KEY, &json));

        if let Err(e) = result {
            warn!(error = %e, "failed to persist matches");
        }
    }
}

pub fn total_change(records: &[MatchRecord]) -> i64 {
    records.iter().map(|m| i64::from(m.rating_change)).sum()
}
