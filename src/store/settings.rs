use super::kv::KeyValueStore;
use crate::analysis::time_range::TimeRange;
use crate::error::AppError;
use crate::model::heroes;
use crate::model::types::ParseEnumError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    Daily,
    Weekly,
    Monthly,
    Never,
}

impl BackupFrequency {
    pub fn interval(self) -> Option<Duration> {
        match self {
            BackupFrequency::Daily => Some(Duration::days(1)),
            BackupFrequency::Weekly => Some(Duration::days(7)),
            BackupFrequency::Monthly => Some(Duration::days(30)),
            BackupFrequency::Never => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackupFrequency::Daily => "daily",
            BackupFrequency::Weekly => "weekly",
            BackupFrequency::Monthly => "monthly",
            BackupFrequency::Never => "never",
        }
    }
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl FromStr for Theme {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ParseEnumError::new("theme", s)),
        }
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ru" | "russian" => Ok(Language::Ru),
            _ => Err(ParseEnumError::new("language", s)),
        }
    }
}

impl FromStr for BackupFrequency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(BackupFrequency::Daily),
            "weekly" => Ok(BackupFrequency::Weekly),
            "monthly" => Ok(BackupFrequency::Monthly),
            "never" => Ok(BackupFrequency::Never),
            _ => Err(ParseEnumError::new("backup frequency", s)),
        }
    }
}

/// User preferences. The current rating deliberately lives only in the record
/// store; `initial_rating` just seeds a store that has never been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub language: Language,
    #[serde(alias = "initialMmr")]
    pub initial_rating: i64,
    #[serde(alias = "defaultChartPeriod")]
    pub default_range: TimeRange,
    pub auto_backup: bool,
    pub backup_frequency: BackupFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<DateTime<Utc>>,
    pub favorite_heroes: Vec<String>,
    pub mood_carryover_hours: u32,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: Theme::Dark,
            language: Language::En,
            initial_rating: 1500,
            default_range: TimeRange::Month,
            auto_backup: true,
            backup_frequency: BackupFrequency::Weekly,
            last_backup: None,
            favorite_heroes: Vec::new(),
            mood_carryover_hours: 2,
            debug_mode: false,
        }
    }
}

impl Settings {
    pub fn mood_carryover(&self) -> Duration {
        Duration::hours(i64::from(self.mood_carryover_hours))
    }

    /// Whether an automatic backup should be written at `now`.
    pub fn backup_due(&self, now: DateTime<Utc>) -> bool {
        self.auto_backup && backup_due(self.last_backup, self.backup_frequency, now)
    }
}

pub fn backup_due(
    last: Option<DateTime<Utc>>,
    frequency: BackupFrequency,
    now: DateTime<Utc>,
) -> bool {
    let Some(interval) = frequency.interval() else {
        return false;
    };
    match last {
        Some(last) => now.signed_duration_since(last) >= interval,
        None => true,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsDocument {
    pub settings: Settings,
}

/// Reads `{ "settings": {...} }`, the browser app's
/// `{ "state": { "settings": {...} }, "version": n }` envelope, or a bare
/// settings object. Missing fields take their defaults.
pub fn settings_from_value(mut value: serde_json::Value) -> Result<Settings, AppError> {
    if value.get("settings").is_none() {
        if let Some(state) = value.get_mut("state").map(serde_json::Value::take) {
            value = state;
        }
    }
    let value = match value {
        serde_json::Value::Object(mut map) if map.contains_key("settings") => {
            map.remove("settings").unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| AppError::Import(format!("Malformed settings document: {}", e)))
}

/// Loads and saves the settings document, independently of the matches.
#[derive(Debug)]
pub struct SettingsStore<S: KeyValueStore> {
    storage: S,
    settings: Settings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn open(storage: S) -> Result<Self, AppError> {
        let settings = match storage.load(SETTINGS_KEY)? {
            Some(json) => Self::parse(&json).map_err(|e| e.stored(SETTINGS_KEY))?,
            None => Settings::default(),
        };
        Ok(SettingsStore { storage, settings })
    }

    /// Default settings regardless of what `storage` holds.
    pub fn with_defaults(storage: S) -> Self {
        SettingsStore {
            storage,
            settings: Settings::default(),
        }
    }

    pub fn parse(json: &str) -> Result<Settings, AppError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| AppError::Import(format!("Malformed settings document: {}", e)))?;
        settings_from_value(value)
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn set_initial_rating(&mut self, rating: i64) {
        self.settings.initial_rating = rating;
        self.save();
    }

    pub fn set_default_range(&mut self, range: TimeRange) {
        self.settings.default_range = range;
        self.save();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        self.save();
    }

    pub fn set_language(&mut self, language: Language) {
        self.settings.language = language;
        self.save();
    }

    pub fn set_backup(&mut self, auto_backup: bool, frequency: BackupFrequency) {
        self.settings.auto_backup = auto_backup;
        self.settings.backup_frequency = frequency;
        self.save();
    }

    /// Adds a hero by its canonical name. Unknown heroes are rejected and
    /// duplicates ignored; returns the stored name.
    pub fn add_favorite_hero(&mut self, hero: &str) -> Option<&'static str> {
        let name = heroes::canonical_name(hero)?;
        if !self.settings.favorite_heroes.iter().any(|h| h == name) {
            self.settings.favorite_heroes.push(name.to_string());
            self.save();
        }
        Some(name)
    }

    pub fn remove_favorite_hero(&mut self, hero: &str) -> bool {
        let name = heroes::canonical_name(hero).unwrap_or(hero);
        let before = self.settings.favorite_heroes.len();
        self.settings.favorite_heroes.retain(|h| h != name);
        let removed = self.settings.favorite_heroes.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    pub fn toggle_debug_mode(&mut self) -> bool {
        self.settings.debug_mode = !self.settings.debug_mode;
        self.save();
        self.settings.debug_mode
    }

    pub fn mark_backup(&mut self, at: DateTime<Utc>) {
        self.settings.last_backup = Some(at);
        self.save();
    }

    pub fn replace(&mut self, settings: Settings) {
        self.settings = settings;
        self.save();
    }

    pub fn reset(&mut self) {
        self.replace(Settings::default());
    }

    fn save(&mut self) {
        let doc = SettingsDocument {
            settings: self.settings.clone(),
        };
        let result = serde_json::to_string_pretty(&doc)
            .map_err(|e| AppError::Json(format!("Failed to serialize settings: {}", e)))
            .and_then(|json| self.storage.save(SETTINGS_KEY, &json));

        match result {
            Ok(()) => debug!("settings saved"),
            Err(e) => warn!(error = %e, "failed to persist settings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryStore;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn missing_document_yields_defaults() {
        let store = SettingsStore::open(MemoryStore::new()).unwrap();
        assert_eq!(store.get(), &Settings::default());
        assert_eq!(store.get().mood_carryover(), Duration::hours(2));
    }

    #[test]
    fn favorites_are_canonical_and_unique() {
        let storage = MemoryStore::new();
        let mut store = SettingsStore::open(storage.clone()).unwrap();

        assert_eq!(store.add_favorite_hero("pudge"), Some("Pudge"));
        assert_eq!(store.add_favorite_hero("PUDGE"), Some("Pudge"));
        assert_eq!(store.add_favorite_hero("Nobody"), None);
        store.add_favorite_hero("anti mage");
        assert_eq!(store.get().favorite_heroes, vec!["Pudge", "Anti-Mage"]);

        assert!(store.remove_favorite_hero("pudge"));
        assert!(!store.remove_favorite_hero("pudge"));

        let reopened = SettingsStore::open(storage).unwrap();
        assert_eq!(reopened.get().favorite_heroes, vec!["Anti-Mage"]);
    }

    #[test]
    fn reads_browser_settings_envelope() {
        let json = r#"{
            "state": { "settings": {
                "theme": "light",
                "language": "ru",
                "initialMmr": 3200,
                "defaultChartPeriod": "week",
                "currentMmr": 3350,
                "favoriteHeroes": ["Axe"],
                "debugMode": true
            } },
            "version": 0
        }"#;
        let settings = SettingsStore::<MemoryStore>::parse(json).unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.language, Language::Ru);
        assert_eq!(settings.initial_rating, 3200);
        assert_eq!(settings.favorite_heroes, vec!["Axe"]);
        assert!(settings.debug_mode);
        assert_eq!(settings.default_range, TimeRange::Week);
        assert_eq!(settings.backup_frequency, BackupFrequency::Weekly);
    }

    #[test]
    fn backup_schedule() {
        assert!(backup_due(None, BackupFrequency::Weekly, day(1)));
        assert!(!backup_due(None, BackupFrequency::Never, day(1)));
        assert!(!backup_due(Some(day(1)), BackupFrequency::Weekly, day(7)));
        assert!(backup_due(Some(day(1)), BackupFrequency::Weekly, day(8)));
        assert!(backup_due(Some(day(1)), BackupFrequency::Daily, day(2)));

        let mut settings = Settings::default();
        settings.auto_backup = false;
        assert!(!settings.backup_due(day(1)));
    }

    #[test]
    fn appearance_and_backup_preferences_persist() {
        let storage = MemoryStore::new();
        let mut store = SettingsStore::open(storage.clone()).unwrap();

        store.set_theme("light".parse().unwrap());
        store.set_language("RU".parse().unwrap());
        store.set_backup(false, "monthly".parse().unwrap());
        assert!(!store.get().backup_due(day(1)));

        let reopened = SettingsStore::open(storage).unwrap();
        let settings = reopened.get();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.language, Language::Ru);
        assert!(!settings.auto_backup);
        assert_eq!(settings.backup_frequency, BackupFrequency::Monthly);

        assert!("sepia".parse::<Theme>().is_err());
        assert!("hourly".parse::<BackupFrequency>().is_err());
    }

    #[test]
    fn damaged_document_is_reported_as_corrupt_store() {
        let mut storage = MemoryStore::new();
        storage.save(SETTINGS_KEY, "[1, 2").unwrap();
        assert_matches!(
            SettingsStore::open(storage.clone()),
            Err(AppError::CorruptStore { .. })
        );
        assert_eq!(SettingsStore::with_defaults(storage).get(), &Settings::default());
    }

    #[test]
    fn toggle_and_reset() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        assert!(store.toggle_debug_mode());
        store.set_initial_rating(4000);
        store.reset();
        assert_eq!(store.get(), &Settings::default());
    }
}
