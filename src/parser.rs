use chrono::{Duration, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s)@(today|tomorrow|\d{4}-\d{2}-\d{2})(?:\s|$)").expect("valid date regex")
});
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)\^(\d{1,2}):(\d{2})(?:\s|$)").expect("valid time regex"));
static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|\s)~(\d+)(m|h)(?:\s|$)").expect("valid duration regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, PartialEq)]
pub struct ParsedTask {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
}

/// Splits quick-add input into a title and scheduling tokens.
///
/// `@today`, `@tomorrow` or `@2026-10-20` set the date, `^14:30` the time and
/// `~45m` / `~2h` the duration. The first valid token of each kind wins;
/// all recognised tokens are removed from the title, invalid ones stay.
pub fn parse_task_input(input: &str, today: NaiveDate) -> ParsedTask {
    let mut date = None;
    let mut time = None;
    let mut duration_minutes = None;

    // Tokens share their separating whitespace, so pad them apart first.
    let padded = WHITESPACE_RE.replace_all(input, "  ").to_string();
    let mut accepted: Vec<Range<usize>> = Vec::new();

    for caps in DATE_RE.captures_iter(&padded) {
        let token = caps[1].to_ascii_lowercase();
        let parsed = match token.as_str() {
            "today" => Some(today),
            "tomorrow" => Some(today + Duration::days(1)),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
        };
        if let Some(parsed) = parsed {
            date = date.or(Some(parsed));
            accepted.extend(caps.get(0).map(|m| m.range()));
        }
    }

    for caps in TIME_RE.captures_iter(&padded) {
        let parsed = match (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
            (Ok(h), Ok(m)) => NaiveTime::from_hms_opt(h, m, 0),
            _ => None,
        };
        if let Some(parsed) = parsed {
            time = time.or(Some(parsed));
            accepted.extend(caps.get(0).map(|m| m.range()));
        }
    }

    for caps in DURATION_RE.captures_iter(&padded) {
        let minutes = caps[1].parse::<u32>().ok().and_then(|n| {
            if caps[2].eq_ignore_ascii_case("h") {
                n.checked_mul(60)
            } else {
                Some(n)
            }
        });
        if let Some(minutes) = minutes.filter(|m| *m > 0) {
            duration_minutes = duration_minutes.or(Some(minutes));
            accepted.extend(caps.get(0).map(|m| m.range()));
        }
    }

    let title = strip_ranges(&padded, accepted);

    ParsedTask {
        title,
        date,
        time,
        duration_minutes,
    }
}

/// Cuts the matched spans out by position, so identical text elsewhere in
/// the input (`bob@today`) is left alone.
fn strip_ranges(padded: &str, mut ranges: Vec<Range<usize>>) -> String {
    ranges.sort_by_key(|r| r.start);
    let mut kept = String::with_capacity(padded.len());
    let mut cursor = 0;
    for range in ranges {
        let start = range.start.max(cursor);
        if start < range.end {
            kept.push_str(&padded[cursor..start]);
            kept.push(' ');
            cursor = range.end;
        }
    }
    kept.push_str(&padded[cursor..]);
    WHITESPACE_RE.replace_all(&kept, " ").trim().to_string()
}
