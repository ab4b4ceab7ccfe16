/// Truncate a string to a maximum number of characters, adding ellipsis if needed
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

/// Format an optional string, returning a default if None
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value.unwrap_or(default).to_string()
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else if let Some(d) = date
        .split_whitespace()
        .next()
        .and_then(|day| chrono::NaiveDate::parse_from_str(day, "%d/%m/%Y").ok())
    {
        // upstream post timestamps look like "02/04/2021 10:05:32"
        d.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Collapse runs of whitespace so multi-line bodies fit on one table row
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Ünïcödé text", 6), "Ünï...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2021-04-02T10:05:32Z"), "Apr 02, 2021");
        assert_eq!(format_date("1990-12-31"), "Dec 31, 1990");
        assert_eq!(format_date("02/04/2021 10:05:32"), "Apr 02, 2021");
        assert_eq!(format_date("someday"), "someday");
    }

    #[test]
    fn test_format_optional_and_single_line() {
        assert_eq!(format_optional(None, "-"), "-");
        assert_eq!(format_optional(Some("x"), "-"), "x");
        assert_eq!(single_line("a\n  b\tc "), "a b c");
    }
}
