//! Integer `YYYYMMDD` date keys.
//!
//! A [`DateKey`] always decodes to a real calendar date, and its numeric
//! encoding orders exactly like the calendar.

use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TraderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, TraderError> {
        if !(1000..=9999).contains(&year) {
            return Err(TraderError::invalid_argument(format!(
                "year {year} cannot be encoded as YYYYMMDD"
            )));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or_else(|| {
                TraderError::invalid_argument(format!(
                    "{year:04}-{month:02}-{day:02} is not a calendar date"
                ))
            })
    }

    /// Decodes a packed `YYYYMMDD` integer.
    pub fn from_value(value: u32) -> Result<Self, TraderError> {
        let year = (value / 10_000) as i32;
        let month = (value / 100) % 100;
        let day = value % 100;
        Self::from_ymd(year, month, day)
    }

    /// Resolves a two-digit year against `today`: years up to today's two-digit
    /// year land in the current century, later ones in the previous century.
    pub fn from_two_digit_year(
        year: u32,
        month: u32,
        day: u32,
        today: NaiveDate,
    ) -> Result<Self, TraderError> {
        if year > 99 {
            return Err(TraderError::invalid_argument(format!(
                "{year} is not a two-digit year"
            )));
        }
        let century = today.year() / 100 * 100;
        let pivot = (today.year() % 100) as u32;
        let full = if year <= pivot {
            century + year as i32
        } else {
            century - 100 + year as i32
        };
        Self::from_ymd(full, month, day)
    }

    /// Parses the abbreviated feed form `D-Mon-YY`, e.g. `2-May-17`.
    pub fn parse_abbreviated(input: &str, today: NaiveDate) -> Result<Self, TraderError> {
        let invalid = || TraderError::invalid_argument(format!("malformed date '{input}'"));
        let mut parts = input.trim().split('-');
        let (Some(day), Some(month), Some(year), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let day: u32 = day.parse().map_err(|_| invalid())?;
        let month = month_from_abbreviation(month).ok_or_else(invalid)?;
        let year: u32 = year.parse().map_err(|_| invalid())?;
        Self::from_two_digit_year(year, month, day, today)
    }

    pub fn value(self) -> u32 {
        let d = self.0;
        d.year() as u32 * 10_000 + d.month() * 100 + d.day()
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn plus_days(self, days: u64) -> Result<Self, TraderError> {
        self.0
            .checked_add_days(Days::new(days))
            .map(DateKey)
            .ok_or_else(|| TraderError::invalid_argument(format!("{self} + {days} days overflows")))
    }

    pub fn minus_days(self, days: u64) -> Result<Self, TraderError> {
        self.0
            .checked_sub_days(Days::new(days))
            .map(DateKey)
            .ok_or_else(|| TraderError::invalid_argument(format!("{self} - {days} days overflows")))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl From<DateKey> for NaiveDate {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

/// Accepts `YYYY-MM-DD` or packed `YYYYMMDD`.
impl FromStr for DateKey {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            let value: u32 = s
                .parse()
                .map_err(|_| TraderError::invalid_argument(format!("malformed date '{s}'")))?;
            return DateKey::from_value(value);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| {
                TraderError::invalid_argument(format!(
                    "malformed date '{s}' (expected YYYY-MM-DD or YYYYMMDD)"
                ))
            })
            .and_then(|d| DateKey::from_ymd(d.year(), d.month(), d.day()))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

fn month_from_abbreviation(abbr: &str) -> Option<u32> {
    let month = match abbr {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(month)
}
