mod analysis;
mod config;
mod display;
mod error;
mod model;
mod store;

use analysis::highlights::highlights;
use analysis::mood::{mood_distribution, mood_transitions, suggest_start_mood, MoodSide};
use analysis::performance::{
    by_hero, by_mood, by_role, overall, recent_form, sort_rows, SortDirection, SortKey,
};
use analysis::query::{MatchQuery, SortOrder};
use analysis::rating::{range_summary, rating_series};
use analysis::time_range::{filter_by_range, TimeRange};
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use config::Config;
use display::output::*;
use error::AppError;
use model::validation::MatchDraft;
use model::{heroes, Difficulty, GameResult, Role};
use std::fs;
use std::path::PathBuf;
use store::backup::{export_state, import_state, write_backup_file};
use store::settings::{BackupFrequency, Language, Theme};
use store::{FileStore, RecordStore, SettingsStore};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Records = RecordStore<FileStore>;
type SettingsFile = SettingsStore<FileStore>;

#[derive(Parser, Debug)]
#[command(name = "MMR Tracker")]
#[command(about = "Track ranked matches and see how your rating moves", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a finished match
    Add {
        #[command(flatten)]
        input: MatchInput,

        /// Token game
        #[arg(long)]
        token: bool,
    },

    /// Change fields of a recorded match
    Edit {
        /// Match id or a unique prefix of it
        id: String,

        #[command(flatten)]
        input: MatchInput,

        /// Mark as token game
        #[arg(long, conflicts_with = "no_token")]
        token: bool,

        /// Clear the token game flag
        #[arg(long)]
        no_token: bool,
    },

    /// Delete a recorded match
    Remove {
        /// Match id or a unique prefix of it
        id: String,
    },

    /// List matches, optionally filtered
    List {
        #[arg(long)]
        hero: Option<String>,

        /// Role number (1-5) or name
        #[arg(long)]
        role: Option<Role>,

        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// win or loss
        #[arg(long)]
        result: Option<GameResult>,

        /// Only token games
        #[arg(long)]
        tokens: bool,

        /// Only games inside this range (today, 7d, 30d, 90d, all)
        #[arg(long)]
        range: Option<TimeRange>,

        /// newest, oldest, rating-high or rating-low
        #[arg(short, long, default_value = "newest")]
        sort: SortOrder,

        /// Number of recent results shown as form
        #[arg(long, default_value = "10")]
        form: usize,
    },

    /// Hero, role and mood statistics for a time range
    Stats {
        /// today, 7d, 30d, 90d or all (default: from settings)
        #[arg(short, long)]
        range: Option<TimeRange>,

        /// Column to sort the hero table by
        #[arg(long, value_enum, default_value = "games")]
        sort_by: HeroSort,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },

    /// Show the rating curve, or correct the current rating
    Rating {
        /// today, 7d, 30d, 90d or all (default: from settings)
        #[arg(short, long)]
        range: Option<TimeRange>,

        /// Overwrite the current rating
        #[arg(long)]
        set: Option<i64>,
    },

    /// Suggest the starting mood for the next game
    SuggestMood,

    /// Search the hero list
    Heroes {
        query: Option<String>,
    },

    /// Write all matches and settings to a JSON file
    Export {
        path: PathBuf,
    },

    /// Replace all matches and settings with a JSON export
    Import {
        path: PathBuf,
    },

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(ClapArgs, Debug)]
struct MatchInput {
    #[arg(long)]
    hero: Option<String>,

    /// Role number (1-5) or name
    #[arg(long)]
    role: Option<String>,

    /// Rating gained (positive) or lost (negative)
    #[arg(short, long, allow_negative_numbers = true)]
    change: Option<i32>,

    /// easy, even, hard, impossible, self-impact or free
    #[arg(short, long)]
    difficulty: Option<String>,

    /// win or loss (default: from the sign of --change)
    #[arg(long)]
    result: Option<String>,

    /// Mood before the game (default: carried over from a recent game)
    #[arg(long)]
    mood_start: Option<String>,

    /// Mood after the game
    #[arg(long)]
    mood_end: Option<String>,

    #[arg(long)]
    comment: Option<String>,
}

impl MatchInput {
    fn into_draft(self) -> MatchDraft {
        MatchDraft {
            hero: self.hero,
            role: self.role,
            rating_change: self.change,
            difficulty: self.difficulty,
            is_token_game: false,
            result: self.result,
            mood_start: self.mood_start,
            mood_end: self.mood_end,
            comment: self.comment,
        }
    }
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    /// Rating a fresh match history starts from
    InitialRating { value: i64 },
    /// Range used by `stats` and `rating` when none is given
    DefaultRange { range: TimeRange },
    /// light or dark
    Theme { theme: Theme },
    /// en or ru
    Language { language: Language },
    /// Configure automatic backups
    Backup {
        /// Turn automatic backups on
        #[arg(long, conflicts_with = "off")]
        on: bool,

        /// Turn automatic backups off
        #[arg(long)]
        off: bool,

        /// daily, weekly, monthly or never
        #[arg(long)]
        frequency: Option<BackupFrequency>,
    },
    FavoriteAdd { hero: String },
    FavoriteRemove { hero: String },
    /// Toggle debug logging
    Debug,
    /// Restore all settings to their defaults
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HeroSort {
    Games,
    Winrate,
    Avg,
}

impl From<HeroSort> for SortKey {
    fn from(sort: HeroSort) -> Self {
        match sort {
            HeroSort::Games => SortKey::Games,
            HeroSort::Winrate => SortKey::WinRate,
            HeroSort::Avg => SortKey::AvgChange,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        match e.downcast_ref::<AppError>() {
            Some(AppError::Validation(errors)) => display_validation_errors(errors),
            _ => display_error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }
}

fn init_tracing(debug_mode: bool) {
    let fallback = if debug_mode {
        "mmr_tracker=debug"
    } else {
        "mmr_tracker=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    if config.no_color {
        colored::control::set_override(false);
    }

    // Restoring a backup or fixing settings must work even when a stored
    // document no longer parses.
    let recover = matches!(args.command, Command::Import { .. } | Command::Settings(_));

    let storage = FileStore::new(&config.data_dir);
    let mut settings = match SettingsStore::open(storage.clone()) {
        Err(AppError::CorruptStore { key, message }) if recover => {
            display_warning(&format!("Ignoring damaged {} document: {}", key, message));
            SettingsStore::with_defaults(storage.clone())
        }
        opened => opened.context("Failed to load settings")?,
    };
    init_tracing(settings.get().debug_mode);

    let initial_rating = settings.get().initial_rating;
    let mut records = match RecordStore::open(storage.clone(), initial_rating) {
        Err(AppError::CorruptStore { key, message }) if recover => {
            display_warning(&format!("Ignoring damaged {} document: {}", key, message));
            RecordStore::fresh(storage, initial_rating)
        }
        opened => opened.context("Failed to load matches")?,
    };

    let mutated = match args.command {
        Command::Add { input, token } => add_match(input, token, &mut records, &settings)?,
        Command::Edit {
            id,
            input,
            token,
            no_token,
        } => edit_match(&id, input, token, no_token, &mut records)?,
        Command::Remove { id } => {
            let id = records.resolve(&id)?;
            records.remove(&id);
            display_success(&format!(
                "Removed match {}. Current rating: {}",
                id.short(),
                records.current_rating()
            ));
            true
        }
        Command::List {
            hero,
            role,
            difficulty,
            result,
            tokens,
            range,
            sort,
            form,
        } => {
            let query = MatchQuery {
                hero: hero.map(|h| {
                    heroes::canonical_name(&h)
                        .map(str::to_string)
                        .unwrap_or(h)
                }),
                role,
                difficulty,
                result,
                token_only: tokens,
                sort,
            };
            let in_range = match range {
                Some(range) => filter_by_range(records.records(), range, &Local::now()),
                None => records.records().to_vec(),
            };
            let shown = query.apply(&in_range);
            display_match_list(&shown, &overall(&shown), &recent_form(&shown, form));
            false
        }
        Command::Stats {
            range,
            sort_by,
            asc,
        } => {
            let range = range.unwrap_or(settings.get().default_range);
            show_stats(&records, range, sort_by.into(), asc);
            false
        }
        Command::Rating { range, set } => {
            if let Some(value) = set {
                records.set_baseline(value);
                display_success(&format!("Current rating set to {}", value));
            }
            let range = range.unwrap_or(settings.get().default_range);
            let visible = filter_by_range(records.records(), range, &Local::now());
            display_rating_overview(
                records.current_rating(),
                range,
                &range_summary(&visible, range),
                &rating_series(records.records(), &visible),
            );
            set.is_some()
        }
        Command::SuggestMood => {
            let suggestion = suggest_start_mood(
                records.last_record(),
                Utc::now(),
                settings.get().mood_carryover(),
            );
            match suggestion {
                Some(mood) => display_info(&format!("Start your next game as: {}", mood.label())),
                None => display_info("No recent game to carry a mood over from."),
            }
            false
        }
        Command::Heroes { query } => {
            let found = heroes::search(query.as_deref().unwrap_or(""));
            display_heroes(&found, &settings.get().favorite_heroes);
            false
        }
        Command::Export { path } => {
            let json = export_state(&records, &settings, Utc::now()).to_json()?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            display_success(&format!(
                "Exported {} matches to {}",
                records.len(),
                path.display()
            ));
            false
        }
        Command::Import { path } => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let doc = import_state(&json, &mut records, &mut settings)?;
            display_success(&format!(
                "Imported {} matches (backup version {}). Current rating: {}",
                doc.matches.matches.len(),
                doc.version,
                records.current_rating()
            ));
            true
        }
        Command::Settings(cmd) => {
            change_settings(cmd, &mut settings, &records);
            false
        }
    };

    if mutated {
        auto_backup(&config, &records, &mut settings);
    }

    Ok(())
}

fn add_match(
    input: MatchInput,
    token: bool,
    records: &mut Records,
    settings: &SettingsFile,
) -> Result<bool> {
    let mut draft = input.into_draft();
    draft.is_token_game = token;

    if draft.mood_start.is_none() {
        let carried = suggest_start_mood(
            records.last_record(),
            Utc::now(),
            settings.get().mood_carryover(),
        );
        if let Some(mood) = carried {
            display_info(&format!("Starting mood carried over from last game: {}", mood.label()));
            draft.mood_start = Some(mood.as_str().to_string());
        }
    }
    draft.infer_result();

    let new = draft.validate().map_err(AppError::from)?;
    let id = records.add(new);
    display_success(&format!(
        "Saved match {}. Current rating: {}",
        id.short(),
        records.current_rating()
    ));
    if let Some(saved) = records.get(&id) {
        display_match_detail(saved);
    }
    Ok(true)
}

fn edit_match(
    prefix: &str,
    input: MatchInput,
    token: bool,
    no_token: bool,
    records: &mut Records,
) -> Result<bool> {
    let id = records.resolve(prefix)?;

    let mut patch = input.into_draft().to_patch().map_err(AppError::from)?;
    if token {
        patch.is_token_game = Some(true);
    } else if no_token {
        patch.is_token_game = Some(false);
    }

    if patch.is_empty() {
        display_warning("Nothing to change.");
        return Ok(false);
    }

    records.update(&id, patch);
    display_success(&format!(
        "Updated match {}. Current rating: {}",
        id.short(),
        records.current_rating()
    ));
    if let Some(updated) = records.get(&id) {
        display_match_detail(updated);
    }
    Ok(true)
}

fn show_stats(records: &Records, range: TimeRange, sort_key: SortKey, asc: bool) {
    let visible = filter_by_range(records.records(), range, &Local::now());
    display_info(&format!("{} games in range: {}", visible.len(), range.label()));

    let direction = if asc {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    let mut hero_rows = by_hero(&visible);
    sort_rows(&mut hero_rows, sort_key, direction);
    display_hero_table(&hero_rows);

    let role_rows = by_role(&visible);
    display_role_table(&role_rows, highlights(&role_rows).as_ref());

    display_mood_table(&by_mood(&visible));
    display_mood_distribution(
        &mood_distribution(&visible, MoodSide::Start),
        &mood_distribution(&visible, MoodSide::End),
    );
    display_mood_transitions(&mood_transitions(&visible));
}

fn change_settings(cmd: SettingsCommand, settings: &mut SettingsFile, records: &Records) {
    match cmd {
        SettingsCommand::Show => {
            display_settings(settings.get(), records.current_rating(), records.baseline())
        }
        SettingsCommand::InitialRating { value } => {
            settings.set_initial_rating(value);
            display_success(&format!("Initial rating set to {}", value));
            if !records.is_empty() {
                display_info("Existing matches keep their rating; use `rating --set` to correct it.");
            }
        }
        SettingsCommand::DefaultRange { range } => {
            settings.set_default_range(range);
            display_success(&format!("Default range set to {}", range.label()));
        }
        SettingsCommand::Theme { theme } => {
            settings.set_theme(theme);
            display_success(&format!("Theme set to {}", theme.as_str()));
        }
        SettingsCommand::Language { language } => {
            settings.set_language(language);
            display_success(&format!("Language set to {}", language.as_str()));
        }
        SettingsCommand::Backup { on, off, frequency } => {
            let current = settings.get();
            let auto_backup = if on {
                true
            } else if off {
                false
            } else {
                current.auto_backup
            };
            let frequency = frequency.unwrap_or(current.backup_frequency);
            settings.set_backup(auto_backup, frequency);
            display_success(&format!(
                "Automatic backups {} ({})",
                if auto_backup { "on" } else { "off" },
                frequency.as_str()
            ));
        }
        SettingsCommand::FavoriteAdd { hero } => match settings.add_favorite_hero(&hero) {
            Some(name) => display_success(&format!("{} is a favorite hero", name)),
            None => display_error(&format!("Unknown hero: {}", hero)),
        },
        SettingsCommand::FavoriteRemove { hero } => {
            if settings.remove_favorite_hero(&hero) {
                display_success(&format!("Removed {} from favorites", hero));
            } else {
                display_warning(&format!("{} is not a favorite hero", hero));
            }
        }
        SettingsCommand::Debug => {
            let on = settings.toggle_debug_mode();
            display_success(&format!("Debug mode {}", if on { "on" } else { "off" }));
        }
        SettingsCommand::Reset => {
            settings.reset();
            display_success("Settings restored to defaults");
        }
    }
}

/// Writes a dated backup when one is due. Failures are reported but never
/// undo the command that triggered them.
fn auto_backup(config: &Config, records: &Records, settings: &mut SettingsFile) {
    let now = Utc::now();
    if !settings.get().backup_due(now) {
        return;
    }

    let doc = export_state(records, settings, now);
    match write_backup_file(&config.backup_dir(), &doc, now) {
        Ok(path) => {
            settings.mark_backup(now);
            display_info(&format!("Backup written to {}", path.display()));
        }
        Err(e) => display_warning(&format!("Automatic backup failed: {}", e)),
    }
}
