//! Recurring-period codec.
//!
//! The backend encodes subscription periods as `P{n}{unit}` where the unit
//! is one of `D`, `W`, `M`, `Y`; `P1M` is monthly, `P1Y` yearly. The code
//! travels as a plain JSON string, so the serde impls go through the string
//! form rather than a struct shape.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    fn code(self) -> char {
        match self {
            PeriodUnit::Day => 'D',
            PeriodUnit::Week => 'W',
            PeriodUnit::Month => 'M',
            PeriodUnit::Year => 'Y',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        match c {
            'D' => Some(PeriodUnit::Day),
            'W' => Some(PeriodUnit::Week),
            'M' => Some(PeriodUnit::Month),
            'Y' => Some(PeriodUnit::Year),
            _ => None,
        }
    }

    fn noun(self, plural: bool) -> &'static str {
        match (self, plural) {
            (PeriodUnit::Day, false) => "Day",
            (PeriodUnit::Day, true) => "Days",
            (PeriodUnit::Week, false) => "Week",
            (PeriodUnit::Week, true) => "Weeks",
            (PeriodUnit::Month, false) => "Month",
            (PeriodUnit::Month, true) => "Months",
            (PeriodUnit::Year, false) => "Year",
            (PeriodUnit::Year, true) => "Years",
        }
    }
}

/// A subscription renewal interval, e.g. every month (`P1M`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecurringPeriod {
    pub value: u32,
    pub unit: PeriodUnit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed recurring period code {0:?}")]
pub struct PeriodParseError(pub String);

impl RecurringPeriod {
    pub const fn new(value: u32, unit: PeriodUnit) -> Self {
        Self { value, unit }
    }

    pub fn is_daily(&self) -> bool {
        self.unit == PeriodUnit::Day
    }

    pub fn is_weekly(&self) -> bool {
        self.unit == PeriodUnit::Week
    }

    pub fn is_monthly(&self) -> bool {
        self.unit == PeriodUnit::Month
    }

    pub fn is_yearly(&self) -> bool {
        self.unit == PeriodUnit::Year
    }

    /// Human form for plan rows, e.g. "1 Month" or "2 Weeks".
    pub fn display_text(&self) -> String {
        format!("{} {}", self.value, self.unit.noun(self.value > 1))
    }
}

impl FromStr for RecurringPeriod {
    type Err = PeriodParseError;

    // "P1M" -> prefix 'P', numeric part, single unit letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix('P')
            .ok_or_else(|| PeriodParseError(s.to_string()))?;
        let mut chars = body.chars();
        let unit = chars
            .next_back()
            .and_then(PeriodUnit::from_code)
            .ok_or_else(|| PeriodParseError(s.to_string()))?;
        let value: u32 = chars
            .as_str()
            .parse()
            .map_err(|_| PeriodParseError(s.to_string()))?;
        Ok(RecurringPeriod { value, unit })
    }
}

impl fmt::Display for RecurringPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.value, self.unit.code())
    }
}

impl Serialize for RecurringPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecurringPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
