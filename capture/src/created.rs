use crate::error::CaptureError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Lower bound on a run's creation date, given as a calendar date.
///
/// Only `YYYY-MM-DD` is accepted; timestamps are rejected rather than
/// truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedFilter {
    date: NaiveDate,
}

impl CreatedFilter {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(self) -> NaiveDate {
        self.date
    }

    /// The value of the upstream `created` search qualifier.
    pub fn to_query(self) -> String {
        format!(">={self}")
    }
}

impl FromStr for CreatedFilter {
    type Err = CaptureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || CaptureError::InvalidCreatedFilter {
            value: value.to_string(),
        };
        let bytes = value.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Self::new)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for CreatedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}
