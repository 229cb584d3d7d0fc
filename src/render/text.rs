pub(crate) const NOT_AVAILABLE: &str = "N/A";
pub(crate) const NO_RATING: &str = "Sem avaliação";

/// Escapes text for both element content and double-quoted attribute values.
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// First four characters of a provider date (`2024-03-01` -> `2024`).
pub(crate) fn year_of(date: Option<&str>) -> String {
    date.map(|d| d.chars().take(4).collect::<String>())
        .filter(|y| !y.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn format_score(vote_average: Option<f64>) -> Option<String> {
    vote_average
        .filter(|v| v.is_finite())
        .map(|v| format!("⭐ {v:.1}"))
}

pub(crate) fn format_runtime(minutes: Option<u32>) -> Option<String> {
    minutes
        .filter(|m| *m > 0)
        .map(|m| format!("{}h {}m", m / 60, m % 60))
}

pub(crate) fn format_seasons(seasons: Option<u32>) -> Option<String> {
    seasons
        .filter(|s| *s > 0)
        .map(|s| format!("{s} temporada(s)"))
}
