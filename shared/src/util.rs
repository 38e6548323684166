/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp in whole seconds
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Trimmed value, or `None` when blank
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_units_agree() {
        let millis = now_millis();
        let secs = now_secs();
        assert!((millis / 1000 - secs).abs() <= 1);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  sk_test  "), Some("sk_test"));
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(""), None);
    }
}
