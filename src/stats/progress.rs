//! Answer counts against the daily and weekly targets.
//!
//! Days start at local midnight and weeks on Monday (ISO weeks), in the
//! time zone of the `now` passed in.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;

use crate::config::ProgressConfig;
use crate::core::{unix_timestamp, Answer};
use crate::error::Result;
use crate::storage::VocabularyStore;

/// Answers in one period against its target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodProgress {
    /// Unix time the period started.
    pub since: f64,
    pub answers: usize,
    pub correct: usize,
    pub target: u32,
}

impl PeriodProgress {
    fn count(answers: &[Answer], since: f64, target: u32) -> Self {
        let in_period = answers.iter().filter(|a| a.timestamp >= since);
        let (answers, correct) = in_period.fold((0, 0), |(n, c), a| {
            (n + 1, c + usize::from(a.mark.is_correct()))
        });
        Self {
            since,
            answers,
            correct,
            target,
        }
    }

    /// Whether the target has been reached.
    pub fn met(&self) -> bool {
        self.answers >= self.target as usize
    }

    /// Answers still needed to reach the target.
    pub fn remaining(&self) -> usize {
        (self.target as usize).saturating_sub(self.answers)
    }
}

/// Progress for the current day and ISO week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub today: PeriodProgress,
    pub week: PeriodProgress,
}

impl ProgressReport {
    /// A reminder is due while the daily target is not met.
    pub fn needs_reminder(&self) -> bool {
        !self.today.met()
    }
}

/// Step used to find the end of a DST gap.
const GAP_STEP_MINUTES: i64 = 15;

/// First instant of `date` in `tz`.
///
/// When a DST change skips midnight the day starts at the first local time
/// that exists.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    let mut local = midnight;
    while local.date() == date {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(at) => return at,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => local += Duration::minutes(GAP_STEP_MINUTES),
        }
    }
    tz.from_utc_datetime(&midnight)
}

/// Start of the local day containing `now`.
pub fn day_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(&now.timezone(), now.date_naive())
}

/// Start of the ISO week (Monday, local midnight) containing `now`.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let date = now.date_naive();
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    local_midnight(&now.timezone(), monday)
}

/// Count today's and this week's answers.
pub fn progress<S, Tz>(store: &S, now: &DateTime<Tz>, config: &ProgressConfig) -> Result<ProgressReport>
where
    S: VocabularyStore + ?Sized,
    Tz: TimeZone,
{
    let week_since = unix_timestamp(&week_start(now));
    let day_since = unix_timestamp(&day_start(now));
    let answers = store.answers_since(week_since)?;

    let report = ProgressReport {
        today: PeriodProgress::count(&answers, day_since, config.daily_target),
        week: PeriodProgress::count(&answers, week_since, config.weekly_target),
    };

    tracing::debug!(
        today = report.today.answers,
        week = report.week.answers,
        "counted progress"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ENGLISH_TO_SWEDISH, SWEDISH_TO_ENGLISH};
    use crate::storage::traits::tests::seed_words;
    use crate::storage::MemoryStore;
    use chrono::{FixedOffset, NaiveDateTime, Utc};

    #[test]
    fn test_day_and_week_start() {
        // Thursday afternoon.
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 15, 30, 0).unwrap();
        assert_eq!(
            day_start(&now),
            Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap()
        );
        assert_eq!(
            week_start(&now),
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_week_start_on_monday_is_same_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 1).unwrap();
        assert_eq!(week_start(&now), day_start(&now));
    }

    #[test]
    fn test_periods_follow_local_time_zone() {
        let stockholm = FixedOffset::east_opt(3_600).unwrap();
        let now = stockholm.with_ymd_and_hms(2024, 3, 7, 0, 30, 0).unwrap();
        let start = day_start(&now);
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 3, 6, 23, 0, 0).unwrap()
        );
    }

    /// Clocks jump from UTC-4 to UTC-3 at local midnight on 2024-09-08,
    /// so 00:00 to 00:59 that day never happens.
    #[derive(Debug, Clone, Copy)]
    struct SkipsMidnight;

    impl SkipsMidnight {
        const WINTER: i32 = -4 * 3_600;
        const SUMMER: i32 = -3 * 3_600;

        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 9, 8)
                .unwrap()
                .and_hms_opt(4, 0, 0)
                .unwrap()
        }

        fn offset(seconds: i32) -> FixedOffset {
            FixedOffset::east_opt(seconds).unwrap()
        }
    }

    impl TimeZone for SkipsMidnight {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SkipsMidnight
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let winter = *local - Duration::seconds(Self::WINTER.into()) < Self::switch();
            let summer = *local - Duration::seconds(Self::SUMMER.into()) >= Self::switch();
            match (winter, summer) {
                (true, true) => LocalResult::Ambiguous(
                    Self::offset(Self::WINTER),
                    Self::offset(Self::SUMMER),
                ),
                (true, false) => LocalResult::Single(Self::offset(Self::WINTER)),
                (false, true) => LocalResult::Single(Self::offset(Self::SUMMER)),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::offset(Self::WINTER)
            } else {
                Self::offset(Self::SUMMER)
            }
        }
    }

    #[test]
    fn test_day_start_after_skipped_midnight() {
        let now = SkipsMidnight.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 9, 8)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
        );
        let start = day_start(&now);

        // 01:00 local, the first minute of the day that exists.
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 9, 8, 4, 0, 0).unwrap()
        );
        assert_eq!(start.date_naive(), now.date_naive());
    }

    #[test]
    fn test_day_start_on_ordinary_day_in_dst_zone() {
        let now = SkipsMidnight.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 9, 9)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
        );
        assert_eq!(
            day_start(&now).with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 9, 9, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_progress_counts_periods() {
        let store = MemoryStore::new();
        let ids = seed_words(&store);
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 15, 0, 0).unwrap();
        let at = |d: u32, h: u32| unix_timestamp(&Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap());

        // Last week, this Monday, today (twice).
        store.record_answer(ids[0], ENGLISH_TO_SWEDISH, 1, at(1, 12)).unwrap();
        store.record_answer(ids[0], ENGLISH_TO_SWEDISH, 0, at(4, 9)).unwrap();
        store.record_answer(ids[1], SWEDISH_TO_ENGLISH, 1, at(7, 8)).unwrap();
        store.record_answer(ids[2], ENGLISH_TO_SWEDISH, 0, at(7, 14)).unwrap();

        let config = ProgressConfig {
            daily_target: 2,
            weekly_target: 5,
        };
        let report = progress(&store, &now, &config).unwrap();

        assert_eq!(report.today.answers, 2);
        assert_eq!(report.today.correct, 1);
        assert!(report.today.met());
        assert!(!report.needs_reminder());

        assert_eq!(report.week.answers, 3);
        assert!(!report.week.met());
        assert_eq!(report.week.remaining(), 2);
    }

    #[test]
    fn test_empty_log_needs_reminder() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 20, 0, 0).unwrap();
        let report = progress(&store, &now, &ProgressConfig::default()).unwrap();

        assert_eq!(report.today.answers, 0);
        assert_eq!(report.today.remaining(), 80);
        assert!(report.needs_reminder());
    }
}
