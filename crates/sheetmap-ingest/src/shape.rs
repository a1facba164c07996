//! Value shape detection shared by the profiler and the row normalizer.
//!
//! Numbers may use a decimal comma and space, dot or comma thousands
//! separators. Dates are recognised by a fixed set of day/month/year layouts.

use std::sync::LazyLock;

use regex::Regex;

/// A date layout: shape regex plus the matching `chrono` format string.
#[derive(Debug, Clone, Copy)]
pub struct DatePattern {
    pub regex: &'static str,
    pub format: &'static str,
}

impl DatePattern {
    pub const fn new(regex: &'static str, format: &'static str) -> Self {
        Self { regex, format }
    }
}

/// Date layouts recognised in raw text, in test order.
///
/// Day and month take one or two digits, the year always four.
pub const DATE_PATTERNS: &[DatePattern] = &[
    DatePattern::new(r"^\d{4}-\d{1,2}-\d{1,2}$", "%Y-%m-%d"),
    DatePattern::new(r"^\d{1,2}/\d{1,2}/\d{4}$", "%d/%m/%Y"),
    DatePattern::new(r"^\d{4}/\d{1,2}/\d{1,2}$", "%Y/%m/%d"),
    DatePattern::new(r"^\d{1,2}-\d{1,2}-\d{4}$", "%d-%m-%Y"),
    DatePattern::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$", "%d.%m.%Y"),
];

static DATE_REGEXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    DATE_PATTERNS
        .iter()
        .map(|p| {
            (
                Regex::new(p.regex).expect("Invalid date pattern regex"),
                p.format,
            )
        })
        .collect()
});

/// Returns the `chrono` format of the first layout `value` matches.
pub fn date_format_for(value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    DATE_REGEXES
        .iter()
        .find(|(regex, _)| regex.is_match(trimmed))
        .map(|(_, format)| *format)
}

/// True if the value has one of the recognised date layouts.
///
/// This is a shape test; `31/02/2024` is date-like even though no such day
/// exists.
pub fn is_date_like(value: &str) -> bool {
    date_format_for(value).is_some()
}

/// True if [`parse_number`] accepts the value.
pub fn is_number_like(value: &str) -> bool {
    parse_number(value).is_some()
}

/// Parses a number written with locale-dependent separators.
///
/// Whitespace is removed, a decimal comma becomes a decimal point and valid
/// thousands groupings are dropped: `"1 234,56"`, `"1.234,56"` and
/// `"1,234.56"` all read as `1234.56`. A lone comma is a decimal comma.
/// Non-finite results are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = normalize_separators(&compact)?;
    let value = normalized.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

fn normalize_separators(s: &str) -> Option<String> {
    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    let (thousands, decimal) = match (commas, dots) {
        (0, 0) => return Some(s.to_string()),
        (_, 0) if commas == 1 => (None, Some(',')),
        (_, 0) => (Some(','), None),
        (0, _) if dots == 1 => (None, Some('.')),
        (0, _) => (Some('.'), None),
        _ => {
            let last_comma = s.rfind(',')?;
            let last_dot = s.rfind('.')?;
            if last_comma > last_dot {
                (Some('.'), Some(','))
            } else {
                (Some(','), Some('.'))
            }
        }
    };

    let (int_part, frac_part) = match decimal {
        Some(sep) => {
            let idx = s.rfind(sep)?;
            (&s[..idx], Some(&s[idx + 1..]))
        }
        None => (s, None),
    };

    let int_digits = match thousands {
        Some(sep) => strip_grouping(int_part, sep)?,
        None => int_part.to_string(),
    };

    match frac_part {
        Some(frac) if frac.contains([',', '.']) => None,
        Some(frac) => Some(format!("{int_digits}.{frac}")),
        None => Some(int_digits),
    }
}

/// Removes a thousands separator, requiring every group after the first to
/// hold exactly three digits.
fn strip_grouping(int_part: &str, sep: char) -> Option<String> {
    let mut groups = int_part.split(sep);
    let mut out = groups.next()?.to_string();
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}
