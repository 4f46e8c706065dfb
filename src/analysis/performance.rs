use crate::model::{GameResult, MatchRecord, Mood, Role};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Games, wins and rating movement for one value of a dimension
/// (a hero, a role, a starting mood, or everything).
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionStats<K> {
    pub key: K,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_change: i64,
    /// Games per role, index 0 is role 1.
    pub role_counts: [usize; 5],
}

impl<K> DimensionStats<K> {
    pub fn new(key: K) -> Self {
        DimensionStats {
            key,
            games: 0,
            wins: 0,
            losses: 0,
            total_change: 0,
            role_counts: [0; 5],
        }
    }

    pub fn add(&mut self, m: &MatchRecord) {
        self.games += 1;
        match m.result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
        }
        self.total_change += i64::from(m.rating_change);
        self.role_counts[usize::from(m.role.number() - 1)] += 1;
    }

    /// Percentage in `[0, 100]`; 0 for an empty group.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64 * 100.0
        }
    }

    pub fn avg_change(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_change as f64 / self.games as f64
        }
    }

    /// Most played role; the lower role number wins a tie.
    pub fn favorite_role(&self) -> Option<Role> {
        let mut best: Option<(Role, usize)> = None;
        for role in Role::ALL {
            let count = self.role_counts[usize::from(role.number() - 1)];
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((role, count));
            }
        }
        best.map(|(role, _)| role)
    }
}

pub struct PerformanceTracker<K: Ord> {
    stats: BTreeMap<K, DimensionStats<K>>,
}

impl<K: Ord + Clone> PerformanceTracker<K> {
    pub fn new() -> Self {
        PerformanceTracker {
            stats: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, key: K, m: &MatchRecord) {
        self.stats
            .entry(key.clone())
            .or_insert_with(|| DimensionStats::new(key))
            .add(m);
    }

    /// One row per observed key, in key order.
    pub fn into_rows(self) -> Vec<DimensionStats<K>> {
        self.stats.into_values().collect()
    }
}

impl<K: Ord + Clone> Default for PerformanceTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn performance_by<K, F>(records: &[MatchRecord], key: F) -> Vec<DimensionStats<K>>
where
    K: Ord + Clone,
    F: Fn(&MatchRecord) -> K,
{
    let mut tracker = PerformanceTracker::new();
    for m in records {
        tracker.add(key(m), m);
    }
    tracker.into_rows()
}

pub fn by_hero(records: &[MatchRecord]) -> Vec<DimensionStats<String>> {
    performance_by(records, |m| m.hero.clone())
}

pub fn by_role(records: &[MatchRecord]) -> Vec<DimensionStats<Role>> {
    performance_by(records, |m| m.role)
}

/// Grouped by the mood going into the game.
pub fn by_mood(records: &[MatchRecord]) -> Vec<DimensionStats<Mood>> {
    performance_by(records, |m| m.mood_start)
}

pub fn overall(records: &[MatchRecord]) -> DimensionStats<()> {
    let mut stats = DimensionStats::new(());
    for m in records {
        stats.add(m);
    }
    stats
}

/// Results of the last `n` games, newest first.
pub fn recent_form(records: &[MatchRecord], n: usize) -> Vec<GameResult> {
    let mut ordered: Vec<(usize, &MatchRecord)> = records.iter().enumerate().collect();
    ordered.sort_by(|(ia, a), (ib, b)| b.date.cmp(&a.date).then(ib.cmp(ia)));
    ordered.into_iter().take(n).map(|(_, m)| m.result).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Games,
    WinRate,
    AvgChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

pub fn sort_rows<K>(rows: &mut [DimensionStats<K>], key: SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = match key {
            SortKey::Games => a.games.cmp(&b.games),
            SortKey::WinRate => a.win_rate().partial_cmp(&b.win_rate()).unwrap_or(Ordering::Equal),
            SortKey::AvgChange => a
                .avg_change()
                .partial_cmp(&b.avg_change())
                .unwrap_or(Ordering::Equal),
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::match_record::fixtures::{at, record};

    fn pudge_pair() -> Vec<MatchRecord> {
        vec![
            record("a", at(10, 0), "Pudge", 25),
            record("b", at(11, 0), "Pudge", -20),
        ]
    }

    #[test]
    fn hero_row_for_one_win_one_loss() {
        let rows = by_hero(&pudge_pair());
        assert_eq!(rows.len(), 1);
        let pudge = &rows[0];
        assert_eq!(pudge.key, "Pudge");
        assert_eq!(pudge.games, 2);
        assert_eq!(pudge.wins, 1);
        assert_eq!(pudge.losses, 1);
        assert_eq!(pudge.win_rate(), 50.0);
        assert_eq!(pudge.total_change, 5);
        assert_eq!(pudge.avg_change(), 2.5);
        assert_eq!(pudge.favorite_role(), Some(Role::Carry));
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        assert!(by_hero(&[]).is_empty());
        assert!(by_role(&[]).is_empty());
        assert!(by_mood(&[]).is_empty());
        let all = overall(&[]);
        assert_eq!(all.games, 0);
        assert_eq!(all.win_rate(), 0.0);
        assert_eq!(all.avg_change(), 0.0);
        assert_eq!(all.favorite_role(), None);
    }

    #[test]
    fn win_rate_stays_in_bounds() {
        let mut records = pudge_pair();
        records.push(record("c", at(12, 0), "Axe", 30));
        records.push(record("d", at(13, 0), "Lion", -30));
        for row in by_hero(&records) {
            let wr = row.win_rate();
            assert!((0.0..=100.0).contains(&wr), "{} out of range", wr);
        }
    }

    #[test]
    fn result_is_counted_as_stored_not_from_sign() {
        let mut rec = record("a", at(10, 0), "Pudge", -15);
        rec.result = GameResult::Win;
        let all = overall(&[rec]);
        assert_eq!(all.wins, 1);
        assert_eq!(all.total_change, -15);
    }

    #[test]
    fn rows_follow_key_order_and_group_roles() {
        let mut records = pudge_pair();
        let mut mid = record("c", at(12, 0), "Axe", 30);
        mid.role = Role::Mid;
        records.push(mid);

        let heroes: Vec<String> = by_hero(&records).into_iter().map(|r| r.key).collect();
        assert_eq!(heroes, vec!["Axe", "Pudge"]);

        let roles = by_role(&records);
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].key, Role::Carry);
        assert_eq!(roles[0].games, 2);
        assert_eq!(roles[1].key, Role::Mid);
        assert_eq!(roles[1].win_rate(), 100.0);
    }

    #[test]
    fn mood_table_groups_by_start_mood() {
        let mut records = pudge_pair();
        records[1].mood_start = Mood::Bad;
        let rows = by_mood(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, Mood::Bad);
        assert_eq!(rows[0].losses, 1);
        assert_eq!(rows[1].key, Mood::Neutral);
        assert_eq!(rows[1].wins, 1);
    }

    #[test]
    fn favorite_role_prefers_lower_number_on_tie() {
        let mut stats = DimensionStats::new("Lion");
        stats.role_counts = [0, 0, 0, 2, 2];
        assert_eq!(stats.favorite_role(), Some(Role::SoftSupport));
        stats.role_counts = [0, 0, 0, 2, 3];
        assert_eq!(stats.favorite_role(), Some(Role::HardSupport));
    }

    #[test]
    fn recent_form_is_newest_first() {
        let records = vec![
            record("a", at(10, 0), "Pudge", 25),
            record("b", at(12, 0), "Pudge", -20),
            record("c", at(11, 0), "Pudge", 10),
        ];
        assert_eq!(
            recent_form(&records, 2),
            vec![GameResult::Loss, GameResult::Win]
        );
        assert_eq!(recent_form(&records, 10).len(), 3);
    }

    #[test]
    fn sorting_rows() {
        let records = vec![
            record("a", at(10, 0), "Pudge", 25),
            record("b", at(11, 0), "Pudge", -20),
            record("c", at(12, 0), "Axe", 30),
            record("d", at(13, 0), "Lion", -40),
            record("e", at(14, 0), "Lion", -10),
        ];
        let mut rows = by_hero(&records);

        sort_rows(&mut rows, SortKey::WinRate, SortDirection::Desc);
        assert_eq!(rows[0].key, "Axe");
        assert_eq!(rows[2].key, "Lion");

        sort_rows(&mut rows, SortKey::AvgChange, SortDirection::Asc);
        assert_eq!(rows[0].key, "Lion");

        sort_rows(&mut rows, SortKey::Games, SortDirection::Desc);
        assert_eq!(rows[2].key, "Axe");
    }
}
