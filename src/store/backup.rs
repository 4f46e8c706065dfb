use super::document::MatchesDocument;
use super::kv::KeyValueStore;
use super::records::RecordStore;
use super::settings::{settings_from_value, Settings, SettingsDocument, SettingsStore};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const BACKUP_VERSION: &str = "1.0.0";

/// Full application state in one JSON document, used for backup and restore.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupDocument {
    pub version: String,
    pub export_date: Option<DateTime<Utc>>,
    pub matches: MatchesDocument,
    pub settings: Settings,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupOut<'a> {
    matches: &'a MatchesDocument,
    settings: SettingsDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_date: Option<DateTime<Utc>>,
    version: &'a str,
}

// The two halves stay raw until the envelope is known to be complete, then go
// through the same migrations as the stored documents.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupIn {
    matches: Value,
    settings: Value,
    #[serde(default)]
    export_date: Option<DateTime<Utc>>,
    version: String,
}

impl BackupDocument {
    pub fn capture(matches: MatchesDocument, settings: Settings, now: DateTime<Utc>) -> Self {
        BackupDocument {
            version: BACKUP_VERSION.to_string(),
            export_date: Some(now),
            matches,
            settings,
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        let out = BackupOut {
            matches: &self.matches,
            settings: SettingsDocument {
                settings: self.settings.clone(),
            },
            export_date: self.export_date,
            version: &self.version,
        };
        serde_json::to_string_pretty(&out)
            .map_err(|e| AppError::Json(format!("Failed to serialize backup: {}", e)))
    }

    /// Parses a complete backup. `matches`, `settings` and `version` are all
    /// required; any problem is reported as [`AppError::Import`].
    pub fn parse(json: &str) -> Result<Self, AppError> {
        let raw: BackupIn = serde_json::from_str(json)
            .map_err(|e| AppError::Import(format!("Invalid backup file: {}", e)))?;

        Ok(BackupDocument {
            matches: MatchesDocument::from_value(raw.matches)?,
            settings: settings_from_value(raw.settings)?,
            export_date: raw.export_date,
            version: raw.version,
        })
    }
}

pub fn export_state<A, B>(
    records: &RecordStore<A>,
    settings: &SettingsStore<B>,
    now: DateTime<Utc>,
) -> BackupDocument
where
    A: KeyValueStore,
    B: KeyValueStore,
{
    BackupDocument::capture(records.to_document(), settings.get().clone(), now)
}

/// Replaces both stores with the content of `json`. Nothing is touched unless
/// the whole document parses.
pub fn import_state<A, B>(
    json: &str,
    records: &mut RecordStore<A>,
    settings: &mut SettingsStore<B>,
) -> Result<BackupDocument, AppError>
where
    A: KeyValueStore,
    B: KeyValueStore,
{
    let doc = BackupDocument::parse(json)?;

    records.replace(doc.matches.clone());
    settings.replace(doc.settings.clone());
    info!(
        matches = doc.matches.matches.len(),
        version = %doc.version,
        "imported backup"
    );

    Ok(doc)
}

pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("mmr-tracker-backup-{}.json", now.format("%Y-%m-%d"))
}

/// Writes `doc` into `dir` under a dated file name and returns its path.
pub fn write_backup_file(dir: &Path, doc: &BackupDocument, now: DateTime<Utc>) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;

    let path = dir.join(backup_file_name(now));
    fs::write(&path, doc.to_json()?)
        .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), "backup written");
    Ok(path)
}
