//! Deployment date formatting.
//!
//! Deployments configure the short date format the way Django does, with
//! PHP-style specifiers (`d/m/Y`). These are converted to chrono strftime
//! patterns once, at construction.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use crate::error::SettingsError;
use crate::settings::ValidatorSettings;

/// Renders dates for user-facing messages and maps instants to local dates.
pub trait DateFormatter {
    fn format_date(&self, date: NaiveDate) -> String;

    /// The calendar date of `at` in the deployment's local time.
    fn to_local_date(&self, at: DateTime<Utc>) -> NaiveDate;
}

fn php_specifier(c: char) -> Option<&'static str> {
    let spec = match c {
        // Day
        'd' => "%d",
        'j' => "%-d",
        'D' => "%a",
        'l' => "%A",
        'N' => "%u",
        'w' => "%w",
        'z' => "%-j",
        // Week, month, year
        'W' => "%V",
        'F' => "%B",
        'M' => "%b",
        'm' => "%m",
        'n' => "%-m",
        'y' => "%y",
        'Y' => "%Y",
        'o' => "%G",
        // Time
        'a' => "%P",
        'A' => "%p",
        'g' => "%-I",
        'G' => "%-H",
        'h' => "%I",
        'H' => "%H",
        'i' => "%M",
        's' => "%S",
        // Zone and full stamps
        'e' | 'T' => "%Z",
        'O' => "%z",
        'P' => "%:z",
        'c' => "%+",
        'U' => "%s",
        _ => return None,
    };
    Some(spec)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Convert a PHP/Django date format string into a chrono strftime pattern.
///
/// Unknown letters are kept literally; a backslash escapes the next character.
pub fn convert_php_dateformat(php_format: &str) -> String {
    let mut out = String::with_capacity(php_format.len() * 2);
    let mut chars = php_format.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                push_literal(&mut out, escaped);
            }
            continue;
        }
        match php_specifier(c) {
            Some(spec) => out.push_str(spec),
            None => push_literal(&mut out, c),
        }
    }
    out
}

/// [`DateFormatter`] backed by the configured short date format.
#[derive(Debug, Clone)]
pub struct ShortDateFormatter {
    php_format: String,
    strftime: String,
    offset: FixedOffset,
}

impl ShortDateFormatter {
    pub fn new(php_format: &str, offset: FixedOffset) -> Result<Self, SettingsError> {
        let strftime = convert_php_dateformat(php_format);
        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(SettingsError::InvalidDateFormat {
                format: php_format.to_string(),
                message: format!("unsupported strftime pattern {strftime:?}"),
            });
        }
        Ok(Self {
            php_format: php_format.to_string(),
            strftime,
            offset,
        })
    }

    pub fn from_settings(settings: &ValidatorSettings) -> Result<Self, SettingsError> {
        Self::new(&settings.short_date_format, settings.utc_offset()?)
    }

    pub fn php_format(&self) -> &str {
        &self.php_format
    }

    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for ShortDateFormatter {
    fn default() -> Self {
        Self {
            php_format: "m/d/Y".to_string(),
            strftime: "%m/%d/%Y".to_string(),
            offset: Utc.fix(),
        }
    }
}

impl DateFormatter for ShortDateFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        // Format as local midnight so time and zone specifiers have something to render.
        let Some(local) = date
            .and_time(NaiveTime::MIN)
            .and_local_timezone(self.offset)
            .single()
        else {
            return date.to_string();
        };
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.strftime)).is_err() {
            return date.to_string();
        }
        out
    }

    fn to_local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}
