//! Filter library: named, total string transforms for `{{path | filter:args}}`.
//!
//! Every filter is total from the caller's point of view: unknown names and
//! internal failures both degrade to the stringified raw value.

use serde_json::Value;

use cvtpl_core::value::{as_number, has_content, is_truthy, resolve, stringify};

use crate::date::{format_date, parse_date};
use crate::error::FilterError;

const DEFAULT_JOIN_SEPARATOR: &str = ", ";
const DEFAULT_TRUNCATE_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Filter expression parsing
// ---------------------------------------------------------------------------

/// A parsed `name[:arg1:arg2...]` filter suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterExpr {
    /// Split on `:` outside of quotes. Quoted arguments keep their inner
    /// whitespace; unquoted ones are trimmed.
    pub fn parse(expr: &str) -> FilterExpr {
        let mut parts: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut quote: Option<char> = None;
        let mut quoted = false;

        for c in expr.trim().chars() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), c) => current.push(c),
                (None, '"' | '\'') => {
                    if !quoted {
                        current.clear();
                    }
                    quote = Some(c);
                    quoted = true;
                }
                (None, ':') => {
                    parts.push(finish_arg(&current, quoted));
                    current.clear();
                    quoted = false;
                }
                (None, c) if quoted && c.is_whitespace() => {}
                (None, c) => current.push(c),
            }
        }
        parts.push(finish_arg(&current, quoted));

        let mut parts = parts.into_iter();
        let name = parts.next().unwrap_or_default();
        FilterExpr {
            name,
            args: parts.collect(),
        }
    }
}

fn non_empty_arg(args: &[String], i: usize) -> Option<&str> {
    args.get(i).map(String::as_str).filter(|a| !a.is_empty())
}

fn finish_arg(raw: &str, quoted: bool) -> String {
    if quoted {
        raw.to_string()
    } else {
        raw.trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Every built-in filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    FormatDate,
    FormatDateRange,
    Join,
    Truncate,
    Capitalize,
    FormatProficiency,
    Default,
    Uppercase,
    Lowercase,
}

impl Filter {
    /// All filters in a stable order.
    pub fn all() -> &'static [Filter] {
        &[
            Filter::FormatDate,
            Filter::FormatDateRange,
            Filter::Join,
            Filter::Truncate,
            Filter::Capitalize,
            Filter::FormatProficiency,
            Filter::Default,
            Filter::Uppercase,
            Filter::Lowercase,
        ]
    }

    /// Name as written in templates.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::FormatDate        => "formatDate",
            Filter::FormatDateRange   => "formatDateRange",
            Filter::Join              => "join",
            Filter::Truncate          => "truncate",
            Filter::Capitalize        => "capitalize",
            Filter::FormatProficiency => "formatProficiency",
            Filter::Default           => "default",
            Filter::Uppercase         => "uppercase",
            Filter::Lowercase         => "lowercase",
        }
    }

    /// Usage line, e.g. `truncate[:length=100]`.
    pub fn usage(&self) -> &'static str {
        match self {
            Filter::FormatDate        => "formatDate[:pattern]",
            Filter::FormatDateRange   => "formatDateRange[:pattern]",
            Filter::Join              => "join[:separator=\", \"]",
            Filter::Truncate          => "truncate[:length=100]",
            Filter::Capitalize        => "capitalize",
            Filter::FormatProficiency => "formatProficiency",
            Filter::Default           => "default[:fallback]",
            Filter::Uppercase         => "uppercase",
            Filter::Lowercase         => "lowercase",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Filter::FormatDate => "format a date with a date-fns pattern",
            Filter::FormatDateRange => "\"<start> - <end>\" or \"<start> - Present\" from startDate/endDate/isCurrent",
            Filter::Join => "join non-empty array elements",
            Filter::Truncate => "cut to length characters and append \"...\"",
            Filter::Capitalize => "upper-case the first letter, lower-case the rest",
            Filter::FormatProficiency => "map a 1-10 level to Novice/Beginner/Intermediate/Advanced/Expert",
            Filter::Default => "substitute fallback for null or empty values",
            Filter::Uppercase => "upper-case",
            Filter::Lowercase => "lower-case",
        }
    }

    pub fn from_name(name: &str) -> Option<Filter> {
        Filter::all().iter().copied().find(|f| f.name() == name)
    }

    /// Apply this filter. `date_format` is the pattern used by the date
    /// filters when no argument is given.
    pub fn apply(
        &self,
        value: Option<&Value>,
        args: &[String],
        date_format: &str,
    ) -> Result<String, FilterError> {
        let arg = |i: usize| non_empty_arg(args, i);
        match self {
            Filter::FormatDate => format_date_value(value, arg(0).unwrap_or(date_format)),
            Filter::FormatDateRange => {
                format_date_range(value, arg(0).unwrap_or(date_format), self.name())
            }
            Filter::Join => Ok(join(value, args.first().map_or(DEFAULT_JOIN_SEPARATOR, String::as_str))),
            Filter::Truncate => {
                let length = match arg(0) {
                    Some(raw) => raw.parse::<usize>().map_err(|_| FilterError::InvalidArgument {
                        filter: self.name(),
                        arg: raw.to_string(),
                    })?,
                    None => DEFAULT_TRUNCATE_LENGTH,
                };
                Ok(truncate(&stringify(value), length))
            }
            Filter::Capitalize => Ok(capitalize(&stringify(value))),
            Filter::FormatProficiency => format_proficiency(value, self.name()),
            Filter::Default => match value {
                None | Some(Value::Null) => Ok(args.first().cloned().unwrap_or_default()),
                Some(Value::String(s)) if s.is_empty() => Ok(args.first().cloned().unwrap_or_default()),
                Some(other) => Ok(stringify(Some(other))),
            },
            Filter::Uppercase => Ok(stringify(value).to_uppercase()),
            Filter::Lowercase => Ok(stringify(value).to_lowercase()),
        }
    }
}

/// Apply the filter called `name` to `value`. Never fails.
pub fn apply_filter(value: Option<&Value>, name: &str, args: &[String], date_format: &str) -> String {
    let Some(filter) = Filter::from_name(name) else {
        tracing::debug!("unknown filter '{name}', rendering raw value");
        return stringify(value);
    };
    match filter.apply(value, args, date_format) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::debug!("filter failed, rendering raw value: {err}");
            stringify(value)
        }
    }
}

// ---------------------------------------------------------------------------
// Filter bodies
// ---------------------------------------------------------------------------

fn format_date_value(value: Option<&Value>, pattern: &str) -> Result<String, FilterError> {
    let Some(value) = value else {
        return Ok(String::new());
    };
    match parse_date(value) {
        Some(dt) => format_date(&dt, pattern),
        None => Ok(stringify(Some(value))),
    }
}

/// `"<start> - Present"`, `"<start> - <end>"`, `"<start>"`, or `""` without a start.
pub(crate) fn format_date_range(
    value: Option<&Value>,
    pattern: &str,
    filter: &'static str,
) -> Result<String, FilterError> {
    let Some(range) = value.filter(|v| v.is_object()) else {
        return Err(FilterError::NotARange { filter });
    };
    let start = resolve(range, "startDate");
    if !has_content(start) {
        return Ok(String::new());
    }
    let start = format_date_value(start, pattern)?;
    if is_truthy(resolve(range, "isCurrent")) {
        return Ok(format!("{start} - Present"));
    }
    let end = resolve(range, "endDate");
    if has_content(end) {
        let end = format_date_value(end, pattern)?;
        return Ok(format!("{start} - {end}"));
    }
    Ok(start)
}

fn join(value: Option<&Value>, separator: &str) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| has_content(Some(item)))
            .map(|item| stringify(Some(item)))
            .collect::<Vec<_>>()
            .join(separator),
        other => stringify(other),
    }
}

fn truncate(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let cut: String = text.chars().take(length).collect();
    format!("{cut}...")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
    }
}

fn format_proficiency(value: Option<&Value>, filter: &'static str) -> Result<String, FilterError> {
    if value.is_none() {
        return Ok(String::new());
    }
    let level = as_number(value).ok_or_else(|| FilterError::NotANumber {
        filter,
        got: stringify(value),
    })?;
    Ok(proficiency_label(level).to_string())
}

/// Bucket a numeric level: ≥9 Expert, ≥7 Advanced, ≥5 Intermediate, ≥3 Beginner, otherwise Novice.
pub fn proficiency_label(level: f64) -> &'static str {
    if level >= 9.0 {
        "Expert"
    } else if level >= 7.0 {
        "Advanced"
    } else if level >= 5.0 {
        "Intermediate"
    } else if level >= 3.0 {
        "Beginner"
    } else {
        "Novice"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
