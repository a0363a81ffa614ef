/// Format an amount in cents as euros: 1250 -> "12.50 €"
pub fn format_price(cents: u64) -> String {
    format!("{}.{:02} €", cents / 100, cents % 100)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Pad or truncate to an exact display width, for table columns
pub fn fit_column(s: &str, width: usize) -> String {
    let fitted = truncate_string(s, width);
    let pad = width.saturating_sub(fitted.chars().count());
    format!("{}{}", fitted, " ".repeat(pad))
}
