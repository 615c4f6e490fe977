//! Normalization pass shared by both pipelines (spec §4.2): section
//! mapping, event-date extraction, optional location/tag passes.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Date phrases like "July 4, 2025" or "2025-07-04". A phrase that does
/// not confidently parse is dropped, not guessed (spec §4.2).
fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})|(\d{4})-(\d{2})-(\d{2}))\b",
        )
        .expect("static regex compiles")
    })
}

pub fn extract_event_dates(content: &str) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    for cap in date_pattern().captures_iter(content) {
        let parsed = if let Some(month_name) = cap.get(1) {
            let day: u32 = cap.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let year: i32 = cap.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            month_from_name(month_name.as_str()).and_then(|month| NaiveDate::from_ymd_opt(year, month, day))
        } else {
            let year: i32 = cap.get(4).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let month: u32 = cap.get(5).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let day: u32 = cap.get(6).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            NaiveDate::from_ymd_opt(year, month, day)
        };

        if let Some(date) = parsed {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                out.push(Utc.from_utc_datetime(&dt));
            }
        }
    }
    out
}

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    Some(match lower.as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    })
}

/// Thin re-export so extractor call sites don't reach across crates for
/// what is conceptually part of normalization.
pub fn normalize_section(raw: &str) -> String {
    newsdesk_core::section::normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_form_date() {
        let dates = extract_event_dates("The fair runs July 4, 2025 at the fairgrounds.");
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].format("%Y-%m-%d").to_string(), "2025-07-04");
    }

    #[test]
    fn parses_iso_date() {
        let dates = extract_event_dates("Filing deadline is 2025-03-15.");
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].format("%Y-%m-%d").to_string(), "2025-03-15");
    }

    #[test]
    fn ignores_text_with_no_dates() {
        assert!(extract_event_dates("No dates mentioned here at all.").is_empty());
    }
}
