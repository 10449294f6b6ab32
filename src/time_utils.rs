// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for "today" in the configured timezone.

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Calendar date of `now` as seen in `tz`.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// `[start of day, start of next day)` for `date` in `tz`, as RFC 3339 with
/// the zone's offset.
pub fn day_window(tz: Tz, date: NaiveDate) -> (String, String) {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    (start_of_day(tz, date), start_of_day(tz, next))
}

fn start_of_day(tz: Tz, date: NaiveDate) -> String {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    // A DST gap can swallow midnight; fall back to reading it as UTC.
    let local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight));
    local.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_crosses_date_line() {
        // 2026-03-01 20:00 UTC is already 2026-03-02 in Tokyo.
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap();
        assert_eq!(
            today_in(chrono_tz::Asia::Tokyo, now),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
        assert_eq!(
            today_in(chrono_tz::UTC, now),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_day_window_in_tokyo() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let (start, end) = day_window(chrono_tz::Asia::Tokyo, date);
        assert_eq!(start, "2026-12-31T00:00:00+09:00");
        assert_eq!(end, "2027-01-01T00:00:00+09:00");
    }
}
