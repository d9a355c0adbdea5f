//! Fuzzy free-text date parsing.
//!
//! Chart pages print dates in whatever form the editor typed: `14/11/1952`,
//! `1 Jan 2000`, `January 1, 2000`, `3rd January 2019`, sometimes wrapped in
//! other words ("Correct as of ..."). The parser looks for a numeric date
//! first and otherwise picks a day, a month name, and a year out of the
//! tokens, ignoring everything else.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

#[allow(clippy::expect_used)]
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern, always compiles.
    Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b").expect("valid ISO date regex")
});

#[allow(clippy::expect_used)]
static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})\b").expect("valid numeric date regex")
});

#[allow(clippy::expect_used)]
static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:st|nd|rd|th)?$").expect("valid number token regex"));

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parser for dates embedded in free text.
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    /// Read `01/02/2000` as 1 February rather than January 2.
    day_first: bool,
    /// Year used to place two-digit years within a 100-year window.
    reference_year: i32,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DateParser {
    #[must_use]
    pub fn new(day_first: bool) -> Self {
        Self {
            day_first,
            reference_year: Local::now().year(),
        }
    }

    #[must_use]
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Parse the first date found in `text`.
    ///
    /// Returns `None` unless a day, a month, and a year can all be found.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(caps) = ISO_DATE.captures(text) {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let day = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        if let Some(caps) = NUMERIC_DATE.captures(text) {
            let first: u32 = caps[1].parse().ok()?;
            let second: u32 = caps[2].parse().ok()?;
            let year = self.expand_year(&caps[3])?;
            let (day, month) = if self.day_first {
                (first, second)
            } else {
                (second, first)
            };
            // Fall back to the other reading when the preferred one is not
            // a real date (e.g. 14/11 month-first).
            return NaiveDate::from_ymd_opt(year, month, day)
                .or_else(|| NaiveDate::from_ymd_opt(year, day, month));
        }

        self.parse_tokens(text)
    }

    fn parse_tokens(&self, text: &str) -> Option<NaiveDate> {
        let mut day = None;
        let mut month = None;
        let mut year = None;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let lower = token.to_lowercase();

            if month.is_none() {
                if let Some(m) = month_from_name(&lower) {
                    month = Some(m);
                    continue;
                }
            }

            let Some(caps) = NUMBER_TOKEN.captures(&lower) else {
                continue;
            };
            let digits = &caps[1];
            let Ok(value) = digits.parse::<u32>() else {
                continue;
            };

            if digits.len() == 4 || value > 31 {
                if year.is_none() {
                    year = self.expand_year(digits);
                }
            } else if day.is_none() {
                day = Some(value);
            } else if year.is_none() {
                year = self.expand_year(digits);
            }
        }

        NaiveDate::from_ymd_opt(year?, month?, day?)
    }

    /// Four-digit years pass through; two-digit years land within 50 years
    /// of the reference year.
    fn expand_year(&self, digits: &str) -> Option<i32> {
        let value: i32 = digits.parse().ok()?;
        if digits.len() > 2 {
            return Some(value);
        }

        let century = self.reference_year - self.reference_year.rem_euclid(100);
        let mut year = century + value;
        if year >= self.reference_year + 50 {
            year -= 100;
        } else if year < self.reference_year - 50 {
            year += 100;
        }
        Some(year)
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    if token.len() < 3 || !token.chars().all(char::is_alphabetic) {
        return None;
    }
    if token == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|name| *name == token || (token.len() == 3 && name.starts_with(token)))
        .map(|idx| idx as u32 + 1)
}
