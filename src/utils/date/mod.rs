// Date key derivation
// Turns instants into zone-local "MM-DD" keys and finds the next local midnight

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// The zone every key is derived in unless settings say otherwise.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Prague;

/// Year-independent calendar day, rendered as `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey {
    month: u32,
    day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateKey(pub String);

impl fmt::Display for InvalidDateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date key '{}', expected MM-DD", self.0)
    }
}

impl std::error::Error for InvalidDateKey {}

impl DateKey {
    /// Builds a key if the month/day pair exists in a leap year.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        // 2000 is a leap year, so 02-29 is accepted.
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| Self { month, day })
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// All 366 keys in calendar order, starting at `01-01`.
    pub fn all() -> impl Iterator<Item = DateKey> {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1);
        start
            .into_iter()
            .flat_map(|date| date.iter_days())
            .take_while(|date| date.year() == 2000)
            .map(|date| DateKey::from_date(&date))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDateKey(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b'-' {
            return Err(invalid());
        }
        if !s[0..2].bytes().chain(s[3..5].bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u32 = s[0..2].parse().map_err(|_| invalid())?;
        let day: u32 = s[3..5].parse().map_err(|_| invalid())?;
        DateKey::new(month, day).ok_or_else(invalid)
    }
}

impl TryFrom<String> for DateKey {
    type Error = InvalidDateKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

/// Calendar arithmetic pinned to a single named time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedCalendar {
    tz: Tz,
}

impl Default for ZonedCalendar {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_ZONE)
    }
}

impl ZonedCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    /// Key of the zone-local calendar date containing `instant`.
    pub fn key_for<T: TimeZone>(&self, instant: &DateTime<T>) -> DateKey {
        DateKey::from_date(&instant.with_timezone(&self.tz).date_naive())
    }

    /// The same local wall-clock time one calendar day later.
    ///
    /// When that wall-clock time does not exist (DST gap) or is ambiguous,
    /// the result is shifted to the nearest valid instant on the next day.
    pub fn tomorrow<T: TimeZone>(&self, instant: &DateTime<T>) -> DateTime<Tz> {
        let local = instant.with_timezone(&self.tz);
        if let Some(next) = local.checked_add_days(Days::new(1)) {
            return next;
        }

        let naive = local.naive_local() + Duration::days(1);
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => local + Duration::hours(24),
        }
    }

    pub fn tomorrow_key<T: TimeZone>(&self, instant: &DateTime<T>) -> DateKey {
        self.key_for(&self.tomorrow(instant))
    }

    /// First instant of the local day following the one containing `instant`.
    pub fn next_midnight<T: TimeZone>(&self, instant: &DateTime<T>) -> DateTime<Tz> {
        let local = instant.with_timezone(&self.tz);
        let Some(next_date) = local.date_naive().succ_opt() else {
            return local + Duration::hours(24);
        };

        self.start_of_day(next_date)
            .unwrap_or_else(|| local + Duration::hours(24))
    }

    /// Earliest existing instant on `date`; zones that skip midnight start
    /// their day at the end of the gap.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Tz>> {
        (0..24)
            .flat_map(|hour| (0..60).step_by(15).map(move |minute| (hour, minute)))
            .filter_map(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
            .find_map(|time| match self.tz.from_local_datetime(&date.and_time(time)) {
                LocalResult::Single(dt) => Some(dt),
                LocalResult::Ambiguous(earliest, _) => Some(earliest),
                LocalResult::None => None,
            })
    }
}
