use chrono::{DateTime, NaiveDate};

/// Parses a date as the backend emits it. Plain `YYYY-MM-DD` is used for
/// events and summaries; series timestamps arrive as RFC 2822 HTTP-dates.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    // HTTP-date zone is always GMT; normalise to a numeric offset.
    let rfc2822 = raw.strip_suffix(" GMT").map(|s| format!("{s} +0000"));
    if let Ok(ts) = DateTime::parse_from_rfc2822(rfc2822.as_deref().unwrap_or(raw)) {
        return Some(ts.date_naive());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_api_date("2013-01-01"),
            NaiveDate::from_ymd_opt(2013, 1, 1)
        );
    }

    #[test]
    fn parses_http_dates_from_series_endpoints() {
        assert_eq!(
            parse_api_date("Tue, 01 Jan 2013 00:00:00 GMT"),
            NaiveDate::from_ymd_opt(2013, 1, 1)
        );
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        assert_eq!(
            parse_api_date("2020-04-20T00:00:00Z"),
            NaiveDate::from_ymd_opt(2020, 4, 20)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_api_date("not a date"), None);
        assert_eq!(parse_api_date("   "), None);
    }
}
