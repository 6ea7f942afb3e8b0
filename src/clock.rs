//! Civil time for the newspapers' operating timezone.
//!
//! Every date decision (which day it is, which hour the cutover compares
//! against, what `updated_at` says) is made in one fixed IANA timezone,
//! independent of the server's local timezone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default operating timezone.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Riyadh;

/// Format used for civil dates stored in the database.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for civil timestamps stored in the database.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of "now" in the civil timezone.
///
/// A clock can be frozen at a fixed instant, which is how tests and the
/// `--at` CLI flag pin the day being processed.
#[derive(Debug, Clone, Copy)]
pub struct CivilClock {
    tz: Tz,
    frozen: Option<DateTime<Utc>>,
}

impl Default for CivilClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl CivilClock {
    /// Create a clock following wall-clock time in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz, frozen: None }
    }

    /// Create a clock that always reports `instant`.
    pub fn frozen_at(tz: Tz, instant: DateTime<Utc>) -> Self {
        Self {
            tz,
            frozen: Some(instant),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Current instant in civil time.
    pub fn now(&self) -> DateTime<Tz> {
        self.civil(self.frozen.unwrap_or_else(Utc::now))
    }

    /// Convert an instant into civil time.
    pub fn civil(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Current civil calendar date.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Current civil timestamp formatted for storage.
    pub fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Parse an IANA timezone name such as `Asia/Riyadh`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Whole civil days from `from` to `to` (negative if `to` is earlier).
pub fn civil_days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_frozen_clock_reports_civil_date() {
        // 22:30 UTC on Jan 1 is already Jan 2 in Riyadh (UTC+3).
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 22, 30, 0).unwrap();
        let clock = CivilClock::frozen_at(DEFAULT_TIMEZONE, instant);

        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(clock.now().hour(), 1);
        assert_eq!(clock.timestamp(), "2025-01-02 01:30:00");
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Asia/Riyadh"), Some(DEFAULT_TIMEZONE));
        assert_eq!(parse_timezone(" UTC "), Some(chrono_tz::UTC));
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }

    #[test]
    fn test_civil_days_between() {
        let jan1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let jan4 = NaiveDate::from_ymd_opt(2025, 1, 4).unwrap();
        assert_eq!(civil_days_between(jan1, jan4), 3);
        assert_eq!(civil_days_between(jan4, jan1), -3);
        assert_eq!(civil_days_between(jan1, jan1), 0);
    }
}
