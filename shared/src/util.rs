/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Today's date in the server's local timezone.
///
/// Age and "no future year" rules are evaluated against this date.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Trim a value and drop it when nothing is left.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Emails compare case-insensitively across the registry.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
