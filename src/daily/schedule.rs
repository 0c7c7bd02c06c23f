//! Target date selection for periodic ingestion.

use chrono::{Days, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::datetime::format_ymd;

/// Time of day after which the next day's listing is targeted.
const ROLLOVER_HOUR: u32 = 23;

/// Choose the `date_before` parameter for an ingestion run at `now`.
///
/// The upstream finalizes a day's digest late at night, so a run strictly
/// after 23:00 local time targets tomorrow. Any earlier time, including
/// 23:00:00 exactly, targets today.
pub fn next_target_date(now: NaiveDateTime) -> String {
    let past_rollover = now.hour() > ROLLOVER_HOUR
        || (now.hour() == ROLLOVER_HOUR && (now.minute(), now.second(), now.nanosecond()) != (0, 0, 0));
    let today = now.date();
    let target = if past_rollover {
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    } else {
        today
    };
    format_ymd(target)
}

/// Current local time in the given timezone.
pub fn local_now(tz: &Tz) -> NaiveDateTime {
    tz.from_utc_datetime(&Utc::now().naive_utc()).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_morning_targets_today() {
        assert_eq!(next_target_date(at(10, 0, 0)), "20240101");
        assert_eq!(next_target_date(at(0, 0, 0)), "20240101");
    }

    #[test]
    fn test_exactly_23_targets_today() {
        assert_eq!(next_target_date(at(23, 0, 0)), "20240101");
    }

    #[test]
    fn test_late_night_targets_tomorrow() {
        assert_eq!(next_target_date(at(23, 59, 0)), "20240102");
        assert_eq!(next_target_date(at(23, 0, 1)), "20240102");
    }

    #[test]
    fn test_year_rollover() {
        let new_years_eve = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        assert_eq!(next_target_date(new_years_eve), "20240101");
    }

    #[test]
    fn test_local_now_is_offset_from_utc() {
        let tz: Tz = "Asia/Shanghai".parse().unwrap();
        let local = local_now(&tz);
        let utc = Utc::now().naive_utc();
        let diff = (local - utc).num_minutes();
        assert!((479..=481).contains(&diff));
    }
}
