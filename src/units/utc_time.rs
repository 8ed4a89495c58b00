// Crypto Tax Engine
// Written in 2025 by
//   The cryptotax Developers
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! UTC Time
//!
//! UTC timestamps. This is a thin wrapper around `chrono::DateTime<chrono::offset::Utc>`.
//!

use chrono::offset::Utc;
use chrono::{DateTime, Datelike as _, NaiveDate, ParseError};
use core::str::FromStr as _;
use core::{fmt, num, ops};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum Error {
    ParseError(ParseError),
    ParseNum(num::ParseIntError),
    UnixTimeOutOfRange(i64),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        Error::ParseError(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ParseError(ref e) => e.fmt(f),
            Error::ParseNum(ref e) => e.fmt(f),
            Error::UnixTimeOutOfRange(n) => {
                write!(f, "timestamp {n} out of range for UNIX timestamp")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::ParseError(ref e) => Some(e),
            Error::ParseNum(ref e) => Some(e),
            Error::UnixTimeOutOfRange(_) => None,
        }
    }
}

/// A timestamp fixed to the UTC timezone. This is a thin wrapper around
/// `chrono::DateTime<Utc>`. If you find you need conversions from other
/// timezones please add an explicit conversion function.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct UtcTime {
    inner: DateTime<Utc>,
}

impl UtcTime {
    /// Returns the current time
    pub fn now() -> Self {
        UtcTime { inner: Utc::now() }
    }

    /// Parses a UNIX timestamp from an integer number of seconds
    pub fn from_unix_i64(n: i64) -> Result<Self, Error> {
        Ok(UtcTime {
            inner: chrono::DateTime::from_timestamp(n, 0).ok_or(Error::UnixTimeOutOfRange(n))?,
        })
    }

    /// Parses an RFC 3339 timestamp, e.g. 2024-03-01T12:00:00Z
    pub fn parse_rfc3339(s: &str) -> Result<Self, Error> {
        Ok(UtcTime {
            inner: chrono::DateTime::parse_from_rfc3339(s)?.into(),
        })
    }

    /// Parses a UNIX timestamp from a decimal-string encoded number of seconds
    pub fn from_unix_str(n: &str) -> Result<Self, Error> {
        let i = i64::from_str(n).map_err(Error::ParseNum)?;
        Self::from_unix_i64(i)
    }

    /// Creates an object which can be given to a formatter
    pub fn format<'s>(&self, s: &'s str) -> impl fmt::Display + 's {
        self.inner.format(s)
    }

    /// The calendar date portion of the timestamp
    pub fn date(&self) -> NaiveDate {
        self.inner.date_naive()
    }

    /// Accessor for the year
    pub fn year(&self) -> i32 {
        self.inner.year()
    }
}

impl<T: Into<DateTime<Utc>>> From<T> for UtcTime {
    fn from(t: T) -> Self {
        UtcTime { inner: t.into() }
    }
}

impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl ops::Add<chrono::Duration> for UtcTime {
    type Output = Self;
    fn add(self, other: chrono::Duration) -> Self::Output {
        UtcTime {
            inner: self.inner + other,
        }
    }
}

impl ops::Sub<chrono::Duration> for UtcTime {
    type Output = Self;
    fn sub(self, other: chrono::Duration) -> Self::Output {
        UtcTime {
            inner: self.inner - other,
        }
    }
}

impl ops::Sub for UtcTime {
    type Output = chrono::Duration;
    fn sub(self, other: Self) -> Self::Output {
        self.inner - other.inner
    }
}
