#![forbid(unsafe_code)]

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

/// The recurring week boundary: every Wednesday 18:00 in America/New_York,
/// expressed back as a UTC instant so storage and comparison stay
/// zone-independent. The civil wall time is fixed; the UTC offset applied is
/// whatever the zone uses on that date, so the boundary tracks daylight-saving
/// transitions.
#[derive(Clone, Copy, Debug)]
pub struct WeekClock {
    zone: Tz,
    weekday: Weekday,
    hour: u32,
}

impl Default for WeekClock {
    fn default() -> Self {
        Self {
            zone: New_York,
            weekday: Weekday::Wed,
            hour: 18,
        }
    }
}

impl WeekClock {
    pub fn new(zone: Tz, weekday: Weekday, hour: u32) -> Self {
        Self {
            zone,
            weekday,
            hour: hour.min(23),
        }
    }

    /// The most recent boundary at or before `now`. A Wednesday 17:59 local
    /// resolves to the previous week's boundary; exactly 18:00 starts the new
    /// week.
    pub fn current_week_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.zone);
        let back = (local.weekday().num_days_from_monday() + 7
            - self.weekday.num_days_from_monday())
            % 7;
        let date = local.date_naive() - Duration::days(i64::from(back));
        let candidate = self.boundary_on(date);
        if candidate > now {
            self.boundary_on(date - Duration::days(7))
        } else {
            candidate
        }
    }

    /// The boundary one calendar week after the current one: the next
    /// Wednesday 18:00 civil time. Across a daylight-saving transition this is
    /// 167 or 169 UTC hours away, not 168.
    pub fn next_week_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let current = self.current_week_start(now);
        let date = current.with_timezone(&self.zone).date_naive() + Duration::days(7);
        self.boundary_on(date)
    }

    /// The half-open `[start, end)` window around `now`, in unix milliseconds.
    pub fn window_ms(&self, now_ms: i64) -> (i64, i64) {
        let now = DateTime::from_timestamp_millis(now_ms).unwrap_or(DateTime::UNIX_EPOCH);
        (
            self.current_week_start(now).timestamp_millis(),
            self.next_week_start(now).timestamp_millis(),
        )
    }

    fn boundary_on(&self, date: NaiveDate) -> DateTime<Utc> {
        let Some(naive) = date.and_hms_opt(self.hour, 0, 0) else {
            return DateTime::UNIX_EPOCH;
        };
        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(t) => t.with_timezone(&Utc),
            // Fall-back repeats the wall time; take the earlier instant.
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // Spring-forward gap: the wall time does not exist; skip ahead an
            // hour, which lands past the transition in every tz we configure.
            LocalResult::None => match self.zone.from_local_datetime(&(naive + Duration::hours(1)))
            {
                LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
                LocalResult::None => Utc.from_utc_datetime(&naive),
            },
        }
    }
}
