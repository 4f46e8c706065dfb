use crate::model::{MatchRecord, Mood};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodSide {
    Start,
    End,
}

/// How often each mood was reported on one side of a game. Moods that never
/// occur are left out.
pub fn mood_distribution(records: &[MatchRecord], side: MoodSide) -> Vec<(Mood, usize)> {
    let mut counts: BTreeMap<Mood, usize> = BTreeMap::new();
    for m in records {
        let mood = match side {
            MoodSide::Start => m.mood_start,
            MoodSide::End => m.mood_end,
        };
        *counts.entry(mood).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub to: Mood,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRow {
    pub from: Mood,
    pub total: usize,
    /// Most frequent outcome first.
    pub transitions: Vec<Transition>,
}

/// Where each starting mood ended up, as shares of that starting mood's games.
/// Rows are ordered by number of games, then by mood.
pub fn mood_transitions(records: &[MatchRecord]) -> Vec<TransitionRow> {
    let mut matrix: BTreeMap<Mood, BTreeMap<Mood, usize>> = BTreeMap::new();
    for m in records {
        *matrix
            .entry(m.mood_start)
            .or_default()
            .entry(m.mood_end)
            .or_insert(0) += 1;
    }

    let mut rows: Vec<TransitionRow> = matrix
        .into_iter()
        .map(|(from, ends)| {
            let total: usize = ends.values().sum();
            let mut transitions: Vec<Transition> = ends
                .into_iter()
                .map(|(to, count)| Transition {
                    to,
                    count,
                    percentage: count as f64 / total as f64 * 100.0,
                })
                .collect();
            transitions.sort_by(|a, b| b.count.cmp(&a.count));
            TransitionRow {
                from,
                total,
                transitions,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Carries the end mood of the previous game over as the start mood of the
/// next one, as long as that game finished less than `threshold` ago.
pub fn suggest_start_mood(
    last: Option<&MatchRecord>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> Option<Mood> {
    let last = last?;
    let elapsed = now.signed_duration_since(last.date);
    (elapsed < threshold).then_some(last.mood_end)
}
