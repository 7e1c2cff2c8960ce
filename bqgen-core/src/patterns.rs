//! Anchored format patterns for sniffing date and time strings.
//!
//! All four patterns are assembled from the same fragments so that e.g. the
//! date part of a timestamp accepts exactly what a bare date accepts.

use regex::Regex;

/// `YYYY-MM-DD`, year 0001-9999, month and day with optional leading zero
const DATE: &str = concat!(
    "(?:",
    "(?:000[1-9]|00[1-9][0-9]|0[1-9][0-9]{2}|[1-9][0-9]{3})",
    "-(?:0?[1-9]|1[0-2])",
    "-(?:0?[1-9]|[12][0-9]|3[01])",
    ")"
);

const SEPARATOR: &str = "[ T]";

/// `HH:MM:SS` with up to microsecond precision
const TIME: &str = concat!(
    "(?:",
    "(?:0?[0-9]|1[0-9]|2[0-3])",
    ":(?:0?[0-9]|[1-5][0-9])",
    ":(?:0?[0-9]|[1-5][0-9])",
    "(?:\\.[0-9]{1,6})?",
    ")"
);

/// `Z`, a signed hour offset, or a named zone such as ` America/New_York`
const TIMEZONE: &str = concat!(
    "(?:",
    "Z",
    "|[+-](?:0?[0-9]|1[0-9]|2[0-3])(?::(?:0?[0-9]|[1-5][0-9]))?",
    "|[ ][A-Za-z0-9_]+(?:/[A-Za-z0-9_]+)?/[A-Za-z0-9_]+",
    ")"
);

/// The compiled pattern set. Each pattern only answers "does the whole string match".
#[derive(Debug, Clone)]
pub struct Patterns {
    date: Regex,
    time: Regex,
    datetime: Regex,
    timestamp: Regex,
}

impl Patterns {
    pub fn compile() -> Result<Self, regex::Error> {
        let datetime = format!("{DATE}(?:{SEPARATOR}{TIME})?");
        Ok(Self {
            date: anchored(DATE)?,
            time: anchored(TIME)?,
            timestamp: anchored(&format!("{datetime}{TIMEZONE}?"))?,
            datetime: anchored(&datetime)?,
        })
    }

    pub fn is_date(&self, value: &str) -> bool {
        self.date.is_match(value)
    }

    pub fn is_time(&self, value: &str) -> bool {
        self.time.is_match(value)
    }

    pub fn is_datetime(&self, value: &str) -> bool {
        self.datetime.is_match(value)
    }

    pub fn is_timestamp(&self, value: &str) -> bool {
        self.timestamp.is_match(value)
    }
}

fn anchored(fragment: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^{fragment}$"))
}
