use super::time_range::TimeRange;
use crate::model::MatchRecord;
use chrono::{DateTime, Utc};

/// One point of the cumulative rating curve.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingPoint {
    /// 1-based position inside the visible window.
    pub index: usize,
    pub date: DateTime<Utc>,
    pub hero: String,
    pub change: i32,
    /// Sum of all rating changes up to and including this game, across the
    /// whole history (not just the window).
    pub rating: i64,
}

/// Cumulative rating over `visible`, in date order.
///
/// The curve starts from the sum of every record in `all` dated strictly before
/// the first visible game, so a filtered view continues the full history
/// instead of restarting at zero. Games sharing a timestamp keep their order.
pub fn rating_series(all: &[MatchRecord], visible: &[MatchRecord]) -> Vec<RatingPoint> {
    let mut sorted: Vec<&MatchRecord> = visible.iter().collect();
    sorted.sort_by_key(|m| m.date);

    let Some(first) = sorted.first() else {
        return Vec::new();
    };
    let offset: i64 = all
        .iter()
        .filter(|m| m.date < first.date)
        .map(|m| i64::from(m.rating_change))
        .sum();

    sorted
        .into_iter()
        .enumerate()
        .scan(offset, |rating, (idx, m)| {
            *rating += i64::from(m.rating_change);
            Some(RatingPoint {
                index: idx + 1,
                date: m.date,
                hero: m.hero.clone(),
                change: m.rating_change,
                rating: *rating,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeSummary {
    pub total_change: i64,
    /// Average change per day; for "today" (or a single game) the raw total.
    pub per_day: f64,
    pub games: usize,
}

pub fn range_summary(visible: &[MatchRecord], range: TimeRange) -> RangeSummary {
    if visible.is_empty() {
        return RangeSummary::default();
    }

    let total_change: i64 = visible.iter().map(|m| i64::from(m.rating_change)).sum();
    let per_day = if range == TimeRange::Today || visible.len() == 1 {
        total_change as f64
    } else {
        let first = visible[0].date;
        let (oldest, newest) = visible
            .iter()
            .fold((first, first), |(lo, hi), m| (lo.min(m.date), hi.max(m.date)));
        let elapsed_days = (newest - oldest).num_seconds() as f64 / 86_400.0;
        total_change as f64 / elapsed_days.round().max(1.0)
    };

    RangeSummary {
        total_change,
        per_day,
        games: visible.len(),
    }
}

/// Lowest and highest points of a series.
pub fn series_bounds(series: &[RatingPoint]) -> Option<(i64, i64)> {
    let min = series.iter().map(|p| p.rating).min()?;
    let max = series.iter().map(|p| p.rating).max()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::time_range::filter_by_range;
    use crate::model::match_record::fixtures::{at, record};
    use chrono::{Duration, TimeZone};

    fn ratings(series: &[RatingPoint]) -> Vec<i64> {
        series.iter().map(|p| p.rating).collect()
    }

    #[test]
    fn empty_input_gives_empty_series_and_zero_summary() {
        assert!(rating_series(&[], &[]).is_empty());
        assert_eq!(range_summary(&[], TimeRange::All), RangeSummary::default());
    }

    #[test]
    fn series_is_sorted_by_date_and_cumulative() {
        let records = vec![
            record("c", at(12, 0), "Lion", 30),
            record("a", at(10, 0), "Pudge", 25),
            record("b", at(11, 0), "Pudge", -20),
        ];
        let series = rating_series(&records, &records);
        assert_eq!(ratings(&series), vec![25, 5, 35]);
        assert_eq!(series[2].hero, "Lion");
        assert_eq!(series[2].index, 3);
        // Last point equals the total over all records.
        assert_eq!(series.last().unwrap().rating, 35);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let records = vec![
            record("first", at(10, 0), "Pudge", 10),
            record("second", at(10, 0), "Axe", -3),
        ];
        let series = rating_series(&records, &records);
        assert_eq!(series[0].hero, "Pudge");
        assert_eq!(ratings(&series), vec![10, 7]);
    }

    #[test]
    fn filtered_series_starts_from_earlier_history() {
        let day = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();
        let records = vec![
            record("old1", day(1), "Pudge", 25),
            record("old2", day(2), "Pudge", 25),
            record("new1", day(14), "Axe", -20),
            record("new2", day(15), "Axe", 30),
        ];
        let now = day(15) + Duration::hours(1);
        let visible = filter_by_range(&records, TimeRange::Week, &now);
        let series = rating_series(&records, &visible);
        assert_eq!(ratings(&series), vec![30, 60]);
        assert_eq!(series[0].index, 1);
    }

    #[test]
    fn single_game_per_day_is_its_own_change() {
        let records = vec![record("a", at(10, 0), "Pudge", 30)];
        let series = rating_series(&records, &records);
        assert_eq!(ratings(&series), vec![30]);

        let today = range_summary(&records, TimeRange::Today);
        assert_eq!(today.per_day, 30.0);
        assert_eq!(range_summary(&records, TimeRange::Month).per_day, 30.0);
    }

    #[test]
    fn per_day_divides_by_rounded_elapsed_days() {
        let day = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();
        let records = vec![
            record("a", day(1), "Pudge", 25),
            record("b", day(5), "Pudge", 25),
            record("c", day(5), "Pudge", -10),
        ];
        let summary = range_summary(&records, TimeRange::Month);
        assert_eq!(summary.total_change, 40);
        assert_eq!(summary.games, 3);
        assert_eq!(summary.per_day, 10.0);

        // Several games within a few hours count as one day.
        let same_day = vec![
            record("a", at(10, 0), "Pudge", 25),
            record("b", at(13, 0), "Pudge", 25),
        ];
        assert_eq!(range_summary(&same_day, TimeRange::Week).per_day, 50.0);
        assert_eq!(range_summary(&same_day, TimeRange::Today).per_day, 50.0);
    }

    #[test]
    fn bounds_of_series() {
        let records = vec![
            record("a", at(10, 0), "Pudge", 25),
            record("b", at(11, 0), "Pudge", -40),
        ];
        let series = rating_series(&records, &records);
        assert_eq!(series_bounds(&series), Some((-15, 25)));
        assert_eq!(series_bounds(&[]), None);
    }
}
