//! Calendar date values and date range iteration.

use chrono::{Datelike, Duration, NaiveDate};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Error;
use crate::serde_helpers::{deserialize_date, parse_yyyymmdd, serialize_date};

/// One day on which a service pattern runs. See <https://gtfs.org/reference/static/#calendar_datestxt>
///
/// The value identity of a `CalendarDate` is its `date` alone: two instances
/// with the same day but different feed or service associations are equal,
/// order identically and hash identically. The feed/service association is
/// assigned by the loader after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDate {
    /// Day this value stands for
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub date: NaiveDate,
    /// Feed this date is scoped to, assigned by the loader
    #[serde(default)]
    pub feed_id: Option<String>,
    /// Service pattern this date belongs to, assigned by the loader
    #[serde(default)]
    pub service_id: Option<String>,
}

impl CalendarDate {
    /// Creates an unassociated date value
    pub fn new(date: NaiveDate) -> CalendarDate {
        CalendarDate {
            date,
            feed_id: None,
            service_id: None,
        }
    }

    /// Creates a date value from a (year, month, day) triple
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<CalendarDate, Error> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(CalendarDate::new)
            .ok_or_else(|| Error::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day)))
    }

    /// Parses a date value from an 8-digit `YYYYMMDD` string, the form dates take in feed files
    pub fn from_yyyymmdd(yyyymmdd: &str) -> Result<CalendarDate, Error> {
        parse_yyyymmdd(yyyymmdd).map(CalendarDate::new)
    }

    /// All days from `start` (inclusive) up to `end` (exclusive), one day at a time
    ///
    /// Empty whenever `end <= start`. Every call builds a fresh iterator, so a
    /// range can be re-derived after being consumed.
    pub fn range(start: &CalendarDate, end: &CalendarDate) -> DateRange {
        DateRange {
            cursor: start.date,
            end: end.date,
        }
    }

    /// The day after this one, as a new unassociated value
    pub fn next_day(&self) -> CalendarDate {
        self.plus_days(1)
    }

    /// The day `ndays` after this one, as a new unassociated value
    pub fn plus_days(&self, ndays: i64) -> CalendarDate {
        CalendarDate::new(self.date + Duration::days(ndays))
    }

    /// Day of week, ISO numbering shifted to zero: 0 = Monday .. 6 = Sunday
    pub fn dow(&self) -> u32 {
        self.date.weekday().num_days_from_monday()
    }

    /// The underlying date
    pub fn as_date(&self) -> NaiveDate {
        self.date
    }

    /// Compares against any of the supported operand shapes
    ///
    /// Fails with [Error::InvalidDate] when a text operand is not a valid
    /// `YYYY-MM-DD` date. Unsupported operand types are rejected at compile
    /// time, as only the [DateOperand] shapes can be passed.
    pub fn compare<'a>(&self, other: impl Into<DateOperand<'a>>) -> Result<Ordering, Error> {
        Ok(self.date.cmp(&coerce(other.into())?))
    }

    /// Equality against any of the supported operand shapes, see [CalendarDate::compare]
    pub fn equals<'a>(&self, other: impl Into<DateOperand<'a>>) -> Result<bool, Error> {
        Ok(self.compare(other)? == Ordering::Equal)
    }
}

/// The value shapes a [CalendarDate] can be compared against
pub enum DateOperand<'a> {
    /// A plain date
    Date(NaiveDate),
    /// A `YYYY-MM-DD` formatted string
    Text(&'a str),
    /// Another calendar date value
    CalendarDate(&'a CalendarDate),
}

impl From<NaiveDate> for DateOperand<'static> {
    fn from(date: NaiveDate) -> Self {
        DateOperand::Date(date)
    }
}

impl<'a> From<&'a str> for DateOperand<'a> {
    fn from(text: &'a str) -> Self {
        DateOperand::Text(text)
    }
}

impl<'a> From<&'a CalendarDate> for DateOperand<'a> {
    fn from(date: &'a CalendarDate) -> Self {
        DateOperand::CalendarDate(date)
    }
}

fn coerce(operand: DateOperand) -> Result<NaiveDate, Error> {
    match operand {
        DateOperand::Date(date) => Ok(date),
        DateOperand::Text(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|_| Error::InvalidDate(text.to_owned())),
        DateOperand::CalendarDate(other) => Ok(other.date),
    }
}

impl PartialEq for CalendarDate {
    fn eq(&self, other: &CalendarDate) -> bool {
        self.date == other.date
    }
}

impl Eq for CalendarDate {}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &CalendarDate) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &CalendarDate) -> Ordering {
        self.date.cmp(&other.date)
    }
}

impl PartialEq<NaiveDate> for CalendarDate {
    fn eq(&self, other: &NaiveDate) -> bool {
        self.date == *other
    }
}

impl PartialOrd<NaiveDate> for CalendarDate {
    fn partial_cmp(&self, other: &NaiveDate) -> Option<Ordering> {
        self.date.partial_cmp(other)
    }
}

impl Hash for CalendarDate {
    // Must stay consistent with equality: derived from (year, month, day)
    // only. Not meant to be collision free for out-of-range components,
    // inputs are always valid calendar dates.
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.date.year() * 384 + self.date.month() as i32 * 32 + self.date.day() as i32);
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.feed_id, &self.service_id) {
            (Some(feed_id), Some(service_id)) => {
                write!(f, "{}/{} {}", feed_id, service_id, self.date)
            }
            _ => write!(f, "{}", self.date),
        }
    }
}

/// Lazy iterator over consecutive days, produced by [CalendarDate::range]
#[derive(Debug, Clone)]
pub struct DateRange {
    cursor: NaiveDate,
    end: NaiveDate,
}

impl Iterator for DateRange {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<CalendarDate> {
        if self.cursor >= self.end {
            return None;
        }
        let day = self.cursor;
        // day < end here, so the successor cannot run off the calendar
        self.cursor = day.succ_opt()?;
        Some(CalendarDate::new(day))
    }
}
