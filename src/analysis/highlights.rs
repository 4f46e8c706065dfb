use super::performance::DimensionStats;

/// Stand-out rows of a performance table, e.g. for summary cards above the
/// role table.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlights<K> {
    pub best_win_rate: DimensionStats<K>,
    pub best_average: DimensionStats<K>,
    pub most_played: DimensionStats<K>,
}

// First row with the highest score, so earlier rows win ties.
fn first_max<K, F>(rows: &[DimensionStats<K>], score: F) -> Option<&DimensionStats<K>>
where
    F: Fn(&DimensionStats<K>) -> f64,
{
    let mut best: Option<(&DimensionStats<K>, f64)> = None;
    for row in rows {
        let s = score(row);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((row, s));
        }
    }
    best.map(|(row, _)| row)
}

/// `None` when there are no rows with games.
pub fn highlights<K: Clone>(rows: &[DimensionStats<K>]) -> Option<Highlights<K>> {
    let played: Vec<DimensionStats<K>> = rows.iter().filter(|r| r.games > 0).cloned().collect();

    Some(Highlights {
        best_win_rate: first_max(&played, |r| r.win_rate())?.clone(),
        best_average: first_max(&played, |r| r.avg_change())?.clone(),
        most_played: first_max(&played, |r| r.games as f64)?.clone(),
    })
}
