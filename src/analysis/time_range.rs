use crate::model::types::ParseEnumError;
use crate::model::MatchRecord;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far back a view reaches from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "today", alias = "day")]
    Today,
    #[serde(rename = "7d", alias = "week", alias = "7days")]
    Week,
    #[serde(rename = "30d", alias = "month", alias = "30days")]
    Month,
    #[serde(rename = "90d", alias = "quarter", alias = "90days")]
    Quarter,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "90d",
            TimeRange::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Today => "Today",
            TimeRange::Week => "7 Days",
            TimeRange::Month => "30 Days",
            TimeRange::Quarter => "90 Days",
            TimeRange::All => "All Time",
        }
    }

    fn rolling_days(self) -> Option<i64> {
        match self {
            TimeRange::Week => Some(7),
            TimeRange::Month => Some(30),
            TimeRange::Quarter => Some(90),
            TimeRange::Today | TimeRange::All => None,
        }
    }

    /// Inclusive `[start, end]` bounds at `now`, or `None` for [`TimeRange::All`].
    /// "Today" starts at midnight in `now`'s own timezone.
    pub fn window<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let end = now.with_timezone(&Utc);
        let start = match self {
            TimeRange::All => return None,
            TimeRange::Today => start_of_day(now),
            _ => end - Duration::days(self.rolling_days()?),
        };
        Some((start, end))
    }
}

fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // Midnight skipped by a DST jump: fall back to the elapsed wall-clock time.
        None => now.with_timezone(&Utc) - now.time().signed_duration_since(NaiveTime::MIN),
    }
}

/// Records dated inside `range` at `now`, in their original order.
pub fn filter_by_range<Tz: TimeZone>(
    records: &[MatchRecord],
    range: TimeRange,
    now: &DateTime<Tz>,
) -> Vec<MatchRecord> {
    match range.window(now) {
        None => records.to_vec(),
        Some((start, end)) => records
            .iter()
            .filter(|m| start <= m.date && m.date <= end)
            .cloned()
            .collect(),
    }
}

impl FromStr for TimeRange {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" | "day" => Ok(TimeRange::Today),
            "7d" | "7days" | "week" => Ok(TimeRange::Week),
            "30d" | "30days" | "month" => Ok(TimeRange::Month),
            "90d" | "90days" | "quarter" => Ok(TimeRange::Quarter),
            "all" => Ok(TimeRange::All),
            _ => Err(ParseEnumError::new("time range", s)),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::match_record::fixtures::record;
    use chrono::FixedOffset;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn today_starts_at_midnight_not_24h_ago() {
        let now = utc(15, 9);
        let records = vec![
            record("yesterday-late", utc(14, 23), "Pudge", 10),
            record("this-morning", utc(15, 1), "Pudge", 20),
        ];
        let kept = filter_by_range(&records, TimeRange::Today, &now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "this-morning");
    }

    #[test]
    fn today_uses_the_clock_timezone() {
        // 01:00 on the 15th at UTC+3 is 22:00 UTC on the 14th.
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let records = vec![
            record("before", utc(14, 20), "Pudge", 1),
            record("after", utc(14, 22), "Pudge", 1),
        ];
        let kept = filter_by_range(&records, TimeRange::Today, &now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "after");
    }

    #[test]
    fn rolling_windows_are_inclusive_and_exclude_future() {
        let now = utc(31, 12);
        let records = vec![
            record("old", utc(1, 12), "Pudge", 1),
            record("edge", utc(24, 12), "Pudge", 1),
            record("inside", utc(30, 12), "Pudge", 1),
            record("future", Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap(), "Pudge", 1),
        ];
        let ids: Vec<String> = filter_by_range(&records, TimeRange::Week, &now)
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, vec!["edge", "inside"]);
        assert_eq!(filter_by_range(&records, TimeRange::Month, &now).len(), 3);
    }

    #[test]
    fn all_is_identity() {
        let now = utc(15, 9);
        let records = vec![
            record("b", utc(20, 1), "Axe", 1),
            record("a", utc(1, 1), "Pudge", 1),
        ];
        assert_eq!(filter_by_range(&records, TimeRange::All, &now), records);
        assert!(TimeRange::All.window(&now).is_none());
    }

    #[test]
    fn parses_ui_spellings() {
        assert_eq!("week".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!("90D".parse::<TimeRange>().unwrap(), TimeRange::Quarter);
        assert_eq!(
            serde_json::from_str::<TimeRange>("\"month\"").unwrap(),
            TimeRange::Month
        );
        assert_eq!(serde_json::to_string(&TimeRange::Today).unwrap(), "\"today\"");
        assert!("fortnight".parse::<TimeRange>().is_err());
    }
}
