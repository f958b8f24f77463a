//! Month buckets matching the trend chart's x-axis domain ("YYYY-MM").

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{CloudError, Result};

/// First and last year covered by the bundled datasets.
pub const DATASET_YEARS: (i32, i32) = (2008, 2021);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32, // 1..=12
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| Self {
                year: d.year(),
                month: d.month(),
            })
            .ok_or_else(|| CloudError::invalid_month(format!("{year:04}-{month:02}")))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Inclusive range; endpoints may be given in either order.
    pub fn range(from: Month, to: Month) -> Vec<Month> {
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let mut out = Vec::new();
        let mut cur = lo;
        while cur <= hi {
            out.push(cur);
            cur = cur.next();
        }
        out
    }

    pub fn months_of_year(year: i32) -> Result<Vec<Month>> {
        Ok(Month::range(Month::new(year, 1)?, Month::new(year, 12)?))
    }

    /// Every month of the bundled dataset domain.
    pub fn dataset_domain() -> Vec<Month> {
        Month::range(
            Month { year: DATASET_YEARS.0, month: 1 },
            Month { year: DATASET_YEARS.1, month: 12 },
        )
    }
}

impl FromStr for Month {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let b = s.as_bytes();
        let shaped = b.len() == 7
            && b[4] == b'-'
            && s[..4].chars().all(|c| c.is_ascii_digit())
            && s[5..].chars().all(|c| c.is_ascii_digit());
        if !shaped {
            return Err(CloudError::invalid_month(s));
        }
        let date = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map_err(|_| CloudError::invalid_month(s))?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Drop repeated months, keeping first-seen order.
pub fn dedup_months(months: &[Month]) -> Vec<Month> {
    let mut seen = BTreeSet::new();
    months.iter().copied().filter(|m| seen.insert(*m)).collect()
}

/// Parse a selection, dropping repeats while keeping first-seen order.
pub fn parse_selection<S: AsRef<str>>(ids: &[S]) -> Result<Vec<Month>> {
    let parsed = ids
        .iter()
        .map(|id| id.as_ref().parse())
        .collect::<Result<Vec<Month>>>()?;
    Ok(dedup_months(&parsed))
}
