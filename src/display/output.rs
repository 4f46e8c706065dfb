use crate::analysis::highlights::Highlights;
use crate::analysis::mood::TransitionRow;
use crate::analysis::performance::DimensionStats;
use crate::analysis::rating::{series_bounds, RangeSummary, RatingPoint};
use crate::analysis::time_range::TimeRange;
use crate::model::validation::ValidationErrors;
use crate::model::{GameResult, MatchRecord, Mood, Role};
use crate::store::Settings;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MatchRow {
    id: String,
    date: String,
    hero: String,
    role: String,
    change: String,
    result: String,
    difficulty: String,
    mood: String,
}

#[derive(Tabled)]
struct HeroRow {
    hero: String,
    games: String,
    #[tabled(rename = "W-L")]
    record: String,
    winrate: String,
    #[tabled(rename = "avg")]
    avg_change: String,
    total: String,
    #[tabled(rename = "main role")]
    favorite_role: String,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "")]
    name: String,
    games: String,
    #[tabled(rename = "W-L")]
    record: String,
    winrate: String,
    #[tabled(rename = "avg")]
    avg_change: String,
    total: String,
}

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "#")]
    index: String,
    date: String,
    hero: String,
    change: String,
    #[tabled(rename = "cumulative")]
    rating: String,
}

/// Whole numbers without decimals, everything else with one.
fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn fmt_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", fmt_number(value))
    } else {
        fmt_number(value)
    }
}

fn colored_change(value: f64) -> String {
    let text = fmt_signed(value);
    if value > 0.0 {
        text.green().to_string()
    } else if value < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

fn colored_win_rate(rate: f64) -> String {
    let text = format!("{}%", fmt_number(rate));
    if rate >= 60.0 {
        text.green().to_string()
    } else if rate >= 50.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

fn colored_result(result: GameResult) -> String {
    if result.is_win() {
        result.to_string().green().to_string()
    } else {
        result.to_string().red().to_string()
    }
}

fn heading(title: &str, width: usize) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(width).cyan());
}

fn group_row<K>(name: String, stats: &DimensionStats<K>) -> GroupRow {
    GroupRow {
        name,
        games: stats.games.to_string(),
        record: format!("{}-{}", stats.wins, stats.losses),
        winrate: colored_win_rate(stats.win_rate()),
        avg_change: colored_change(stats.avg_change()),
        total: colored_change(stats.total_change as f64),
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_validation_errors(errors: &ValidationErrors) {
    eprintln!(
        "{} {} problem(s)",
        "❌ Match not saved:".red().bold(),
        errors.len()
    );
    for (field, message) in errors.iter() {
        eprintln!("   {} {}", format!("{}:", field.key()).yellow(), message);
    }
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}

pub fn display_match_list(records: &[MatchRecord], overall: &DimensionStats<()>, form: &[GameResult]) {
    heading(&format!("📋 MATCHES ({} shown)", records.len()), 80);

    if records.is_empty() {
        println!("{}", "No matches recorded yet.".yellow());
        return;
    }

    let streak: Vec<String> = form
        .iter()
        .map(|r| {
            if r.is_win() {
                "W".green().to_string()
            } else {
                "L".red().to_string()
            }
        })
        .collect();
    println!(
        "{} {} W / {} L ({:.0}% WR), {} total   {} {}\n",
        "📈 Overall:".bold(),
        overall.wins.to_string().green(),
        overall.losses.to_string().red(),
        overall.win_rate().round(),
        colored_change(overall.total_change as f64),
        "Last games:".bold(),
        streak.join(" ")
    );

    let rows: Vec<MatchRow> = records
        .iter()
        .map(|m| MatchRow {
            id: m.id.short().to_string(),
            date: m.date.format("%Y-%m-%d %H:%M").to_string(),
            hero: if m.is_token_game {
                format!("{} 🪙", m.hero)
            } else {
                m.hero.clone()
            },
            role: m.role.label().to_string(),
            change: colored_change(f64::from(m.rating_change)),
            result: colored_result(m.result),
            difficulty: m.difficulty.label().to_string(),
            mood: format!("{} → {}", m.mood_start.label(), m.mood_end.label()),
        })
        .collect();
    print_table(rows);
    println!();
}

pub fn display_match_detail(m: &MatchRecord) {
    println!("{} {}", "Match".bold(), m.id.to_string().dimmed());
    println!("  Date:       {}", m.date.format("%Y-%m-%d %H:%M UTC"));
    println!("  Hero:       {}", m.hero);
    println!("  Role:       {}", m.role);
    println!("  Change:     {}", colored_change(f64::from(m.rating_change)));
    println!("  Result:     {}", colored_result(m.result));
    println!("  Difficulty: {}", m.difficulty);
    println!("  Token game: {}", if m.is_token_game { "yes" } else { "no" });
    println!("  Mood:       {} → {}", m.mood_start, m.mood_end);
    if let Some(comment) = &m.comment {
        println!("  Comment:    {}", comment.italic());
    }
}

pub fn display_rating_overview(
    current_rating: i64,
    range: TimeRange,
    summary: &RangeSummary,
    series: &[RatingPoint],
) {
    heading(&format!("📈 RATING ({})", range.label()), 60);

    let per_day_label = if range == TimeRange::Today {
        "Total today:"
    } else {
        "Avg. per day:"
    };
    println!("{} {}", "Current rating:".bold(), current_rating.to_string().cyan().bold());
    println!(
        "{} {}   {} {}   {} {}",
        "Change:".bold(),
        colored_change(summary.total_change as f64),
        per_day_label.bold(),
        colored_change(summary.per_day),
        "Games:".bold(),
        summary.games
    );

    if series.is_empty() {
        if range == TimeRange::Today {
            println!("\n{}", "You haven't played any games today.".yellow());
        } else {
            println!("\n{}", format!("No games found in the selected time range ({}).", range.as_str()).yellow());
        }
        return;
    }

    // Curve values are the cumulative change over the recorded history.
    if let Some((low, high)) = series_bounds(series) {
        println!(
            "{} {}   {} {}\n",
            "Low:".bold(),
            colored_change(low as f64),
            "Peak:".bold(),
            colored_change(high as f64)
        );
    }

    // Only the tail of long histories.
    let skip = series.len().saturating_sub(20);
    let rows: Vec<SeriesRow> = series
        .iter()
        .skip(skip)
        .map(|p| SeriesRow {
            index: p.index.to_string(),
            date: p.date.format("%m/%d %H:%M").to_string(),
            hero: p.hero.clone(),
            change: colored_change(f64::from(p.change)),
            rating: p.rating.to_string(),
        })
        .collect();
    print_table(rows);
}

pub fn display_hero_table(rows: &[DimensionStats<String>]) {
    heading("🦸 HERO PERFORMANCE", 60);
    if rows.is_empty() {
        println!("{}", "No hero data for this period.".yellow());
        return;
    }

    let table: Vec<HeroRow> = rows
        .iter()
        .map(|s| HeroRow {
            hero: s.key.clone(),
            games: s.games.to_string(),
            record: format!("{}-{}", s.wins, s.losses),
            winrate: colored_win_rate(s.win_rate()),
            avg_change: colored_change(s.avg_change()),
            total: colored_change(s.total_change as f64),
            favorite_role: s.favorite_role().map(|r| r.label().to_string()).unwrap_or_default(),
        })
        .collect();
    print_table(table);
}

pub fn display_role_table(rows: &[DimensionStats<Role>], highlights: Option<&Highlights<Role>>) {
    heading("🎯 ROLE PERFORMANCE", 60);
    if rows.is_empty() {
        println!("{}", "No role data for this period.".yellow());
        return;
    }

    if let Some(h) = highlights {
        println!(
            "{} {} ({}% WR)   {} {} ({} avg)   {} {} ({} games)\n",
            "Best role:".bold(),
            h.best_win_rate.key.label(),
            fmt_number(h.best_win_rate.win_rate()),
            "Best rating gain:".bold(),
            h.best_average.key.label(),
            fmt_signed(h.best_average.avg_change()),
            "Most played:".bold(),
            h.most_played.key.label(),
            h.most_played.games
        );
    }

    let table: Vec<GroupRow> = rows.iter().map(|s| group_row(s.key.to_string(), s)).collect();
    print_table(table);
}

pub fn display_mood_table(rows: &[DimensionStats<Mood>]) {
    heading("🙂 MOOD IMPACT (by starting mood)", 60);
    if rows.is_empty() {
        println!("{}", "No mood data for this period.".yellow());
        return;
    }

    let table: Vec<GroupRow> = rows.iter().map(|s| group_row(s.key.label().to_string(), s)).collect();
    print_table(table);
}

pub fn display_mood_distribution(start: &[(Mood, usize)], end: &[(Mood, usize)]) {
    let describe = |counts: &[(Mood, usize)]| -> String {
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        counts
            .iter()
            .map(|(mood, count)| {
                format!("{} {:.0}%", mood.label(), *count as f64 / total.max(1) as f64 * 100.0)
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    if start.is_empty() {
        return;
    }
    println!("\n{} {}", "Before games:".bold(), describe(start));
    println!("{} {}", "After games: ".bold(), describe(end));
}

pub fn display_mood_transitions(rows: &[TransitionRow]) {
    if rows.is_empty() {
        return;
    }

    heading("🔀 MOOD TRANSITIONS", 60);
    for row in rows {
        println!(
            "{} {}",
            row.from.label().bold(),
            format!("({} games)", row.total).dimmed()
        );
        for t in &row.transitions {
            let bar = "█".repeat((t.percentage / 5.0).round() as usize);
            println!(
                "   → {:<9} {} {}% ({})",
                t.to.label(),
                bar.cyan(),
                fmt_number(t.percentage),
                t.count
            );
        }
    }
    println!();
}

pub fn display_settings(settings: &Settings, current_rating: i64, baseline: i64) {
    heading("⚙️  SETTINGS", 60);
    println!("  Current rating:     {}", current_rating.to_string().cyan());
    println!("  Before first game:  {}", baseline);
    println!("  Initial rating:     {}", settings.initial_rating);
    println!("  Default range:      {}", settings.default_range);
    println!("  Theme:              {}", settings.theme.as_str());
    println!("  Language:           {}", settings.language.as_str());
    println!(
        "  Auto backup:        {} ({})",
        if settings.auto_backup { "on" } else { "off" },
        settings.backup_frequency.as_str()
    );
    if let Some(last) = settings.last_backup {
        println!("  Last backup:        {}", last.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Mood carry-over:    {}h", settings.mood_carryover_hours);
    println!(
        "  Favorite heroes:    {}",
        if settings.favorite_heroes.is_empty() {
            "-".to_string()
        } else {
            settings.favorite_heroes.join(", ")
        }
    );
    println!("  Debug mode:         {}\n", if settings.debug_mode { "on" } else { "off" });
}

pub fn display_heroes(heroes: &[&str], favorites: &[String]) {
    if heroes.is_empty() {
        println!("{}", "No heroes match.".yellow());
        return;
    }
    for hero in heroes {
        if favorites.iter().any(|f| f == hero) {
            println!("  {} {}", hero, "⭐".yellow());
        } else {
            println!("  {}", hero);
        }
    }
}
