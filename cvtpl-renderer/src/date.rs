//! Date parsing and date-fns style pattern formatting for the date filters.
//!
//! Supported pattern tokens: `yyyy`/`yy`/`y`, `MMMM`/`MMM`/`MM`/`M`,
//! `dd`/`d`, `EEEE`/`EEE`, `HH`/`H`, `hh`/`h`, `mm`/`m`, `ss`/`s`, `a`.
//! Text inside single quotes is copied verbatim (`''` is a literal quote);
//! any other non-letter character is copied as-is.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde_json::Value;

use crate::error::FilterError;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Parse a record value as a date.
///
/// Accepts RFC 3339 timestamps, `yyyy-MM-ddTHH:mm:ss[.f]`, `yyyy-MM-dd HH:mm:ss`,
/// `yyyy-MM-dd`, `yyyy-MM`, `yyyy`, and numbers as epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        }
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
                NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
            } else {
                None
            }
        })?;
    date.and_hms_opt(0, 0, 0)
}

/// Format `dt` with a date-fns style `pattern`.
///
/// Fails with [`FilterError::UnknownDateToken`] on letters outside the
/// supported token set and [`FilterError::UnterminatedQuote`] on an open
/// quoted literal.
pub fn format_date(dt: &NaiveDateTime, pattern: &str) -> Result<String, FilterError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let close = chars[i + 1..]
                .iter()
                .position(|&ch| ch == '\'')
                .ok_or_else(|| FilterError::UnterminatedQuote(pattern.to_string()))?;
            out.extend(&chars[i + 1..i + 1 + close]);
            i += close + 2;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            out.push(c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&ch| ch == c).count();
        i += run;
        out.push_str(&render_token(dt, c, run)?);
    }

    Ok(out)
}

fn render_token(dt: &NaiveDateTime, letter: char, run: usize) -> Result<String, FilterError> {
    let month = dt.month0() as usize;
    let text = match (letter, run) {
        ('y', 2) => format!("{:02}", dt.year().rem_euclid(100)),
        ('y', 1) => dt.year().to_string(),
        ('y', _) => format!("{:0width$}", dt.year(), width = run),
        ('M', 1) => dt.month().to_string(),
        ('M', 2) => format!("{:02}", dt.month()),
        ('M', 3) => MONTHS[month][..3].to_string(),
        ('M', _) => MONTHS[month].to_string(),
        ('d', 1) => dt.day().to_string(),
        ('d', 2) => format!("{:02}", dt.day()),
        ('E', 1..=3) => WEEKDAYS[dt.weekday().num_days_from_monday() as usize][..3].to_string(),
        ('E', _) => WEEKDAYS[dt.weekday().num_days_from_monday() as usize].to_string(),
        ('H', 1) => dt.hour().to_string(),
        ('H', 2) => format!("{:02}", dt.hour()),
        ('h', 1) => dt.hour12().1.to_string(),
        ('h', 2) => format!("{:02}", dt.hour12().1),
        ('m', 1) => dt.minute().to_string(),
        ('m', 2) => format!("{:02}", dt.minute()),
        ('s', 1) => dt.second().to_string(),
        ('s', 2) => format!("{:02}", dt.second()),
        ('a', _) => (if dt.hour12().0 { "PM" } else { "AM" }).to_string(),
        _ => return Err(FilterError::UnknownDateToken(letter.to_string().repeat(run))),
    };
    Ok(text)
}
