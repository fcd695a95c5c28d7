//! Canonicalization of the wildly inconsistent date formats found in
//! registry output.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

// Timezone abbreviations seen in the wild, mapped to a numeric offset
// that the format ladder can parse.
const OFFSET_ABBREVIATIONS: &[(&str, &str)] = &[
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("JST", "+0900"),
    ("KST", "+0900"),
    ("CEST", "+0200"),
    ("CET", "+0100"),
    ("EDT", "-0400"),
    ("EST", "-0500"),
    ("PDT", "-0700"),
    ("PST", "-0800"),
];

// Formats carrying an explicit offset, tried before any naive format.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%d.%m.%Y %H:%M:%S %z",
];

// Naive formats, assumed UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y.%m.%d"];

const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-\s\.]([A-Za-z]{3,9})[-\s\.](\d{4})$").unwrap());

/// Convert a raw date string into the canonical ISO representation
/// (`1995-08-14T04:00:00.000Z`), or hand back the trimmed original when
/// no known format matches.
///
/// Total over all inputs: never panics, never returns an empty string
/// for non-empty input.
pub fn canonicalize(raw: &str) -> String {
    let original = raw.trim();
    if original.is_empty() {
        return raw.to_string();
    }

    match parse(original) {
        Some(dt) => dt.format(CANONICAL_FORMAT).to_string(),
        None => {
            debug!("Unrecognized date format: {}", original);
            original.to_string()
        }
    }
}

fn parse(text: &str) -> Option<DateTime<Utc>> {
    let cleaned = scrub(text);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&cleaned, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(naive_date) = NaiveDate::parse_from_str(&cleaned, format) {
            let naive_dt = naive_date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    month_name_fallback(&cleaned)
}

/// Strip parenthetical annotations and control characters, and rewrite
/// a trailing timezone abbreviation as a numeric offset.
fn scrub(text: &str) -> String {
    let no_paren = PARENTHETICAL.replace_all(text, "");
    let printable: String = no_paren.chars().filter(|c| !c.is_control()).collect();
    let mut cleaned = printable.trim().to_string();

    for (abbreviation, offset) in OFFSET_ABBREVIATIONS {
        if let Some(stripped) = cleaned.strip_suffix(abbreviation) {
            cleaned = format!("{} {}", stripped.trim_end(), offset);
            break;
        }
    }

    cleaned
}

/// `DD-Mon-YYYY` / `DD Month YYYY` via an explicit month-name table,
/// for registries that spell months out instead of numbering them.
fn month_name_fallback(text: &str) -> Option<DateTime<Utc>> {
    let caps = DAY_MONTH_YEAR.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let name = caps[2].to_ascii_lowercase();

    let month = MONTHS
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|(_, number)| *number)?;

    let naive_dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    Some(DateTime::from_naive_utc_and_offset(naive_dt, Utc))
}
