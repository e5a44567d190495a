//! Display formatting shared by the views.

/// Placeholder for an absent value or empty list
pub const DASH: &str = "-";

/// `part / whole` as a percentage, 0 when `whole` is 0.
pub fn rate(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Ratio in [0, 1] rendered as a whole percentage, e.g. `0.456` -> `46%`.
pub fn ratio_percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

pub fn percent(value: f64) -> String {
    format!("{:.0}%", value)
}

/// Comma-joined list, or a dash when empty
pub fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        DASH.to_string()
    } else {
        items.join(", ")
    }
}

pub fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        DASH
    } else {
        text
    }
}

/// Visual class of a percentage against the "good" threshold
pub fn rate_class(pct: f64, good_threshold: f64) -> &'static str {
    if pct >= good_threshold {
        "good"
    } else {
        "warn"
    }
}

/// ISO timestamp trimmed to `YYYY-MM-DD HH:MM` when it parses.
pub fn timestamp(raw: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| or_dash(raw).to_string())
}
