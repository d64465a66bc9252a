use crate::extractors::youtube::YtDlp;

/// Group the digits of a count with commas, e.g. `1234567` -> `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Format a view count for display, e.g. `"1,234 views"`
pub fn format_views(count: u64) -> String {
    format!("{} views", format_thousands(count))
}

/// Shorten text to at most `max_chars` characters, ending in "..." when cut
///
/// Counts Unicode scalar values, so multi-byte text is never split mid-character.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    const ELLIPSIS: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp: &YtDlp) -> Vec<String> {
    let mut missing = Vec::new();

    if !yt_dlp.check_availability().await {
        missing.push("yt-dlp - required for YouTube metadata and captions".to_string());
    }

    missing
}
