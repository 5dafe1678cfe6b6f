use std::sync::OnceLock;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use regex::Regex;

pub const TITLE_MAX_CHARS: usize = 40;
pub const DATE_FORMAT: &str = "%Y. %-m. %-d.";

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the timestamp forms the deals endpoint emits. Naive values are
/// taken as local time.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local));
    }
    NAIVE_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(value, fmt).ok()?;
        Local.from_local_datetime(&naive).earliest()
    })
}

/// Relative label for `created_at` as seen at `now`.
pub fn time_ago(created_at: &str, now: DateTime<Local>) -> Option<String> {
    let created = parse_timestamp(created_at)?;
    let elapsed_ms = (now - created).num_milliseconds();

    let label = if elapsed_ms < MINUTE_MS {
        "just now".to_string()
    } else if elapsed_ms < HOUR_MS {
        format!("{} minutes ago", elapsed_ms / MINUTE_MS)
    } else if elapsed_ms < DAY_MS {
        format!("{} hours ago", elapsed_ms / HOUR_MS)
    } else if elapsed_ms < 7 * DAY_MS {
        format!("{} days ago", elapsed_ms / DAY_MS)
    } else {
        created.format(DATE_FORMAT).to_string()
    };
    Some(label)
}

pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let mut out: String = title.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\* ").expect("valid bullet regex"))
}

/// Converts an AI answer into display markup: bold markers, then leading
/// list markers, then newlines. Later steps see the markup of earlier ones.
pub fn format_answer(answer: &str) -> String {
    let escaped = escape_html(answer);
    let bolded = bold_re().replace_all(&escaped, "<strong>$1</strong>");
    let bulleted = bullet_re().replace_all(&bolded, "• ");
    bulleted.replace('\n', "<br>")
}
