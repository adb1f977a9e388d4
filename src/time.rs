use chrono::{DateTime, Utc};

/// Formats how long ago a timestamp was, in compact form
///
/// Buckets: seconds under a minute, minutes under an hour, hours under a
/// day, days under a week, weeks under five, months under a year, then
/// years. Timestamps in the future render as "0s".
pub fn format_distance_to_now(then: DateTime<Utc>) -> String {
    let seconds = (Utc::now() - then).num_seconds();
    format_distance(seconds)
}

fn format_distance(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{}d", days);
    }
    let weeks = days / 7;
    if weeks < 5 {
        return format!("{}w", weeks);
    }
    let months = days / 30;
    if months < 12 {
        return format!("{}mo", months);
    }
    let years = days / 365;
    format!("{}y", years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_seconds() {
        assert_eq!(format_distance(0), "0s");
        assert_eq!(format_distance(42), "42s");
        assert_eq!(format_distance(59), "59s");
    }

    #[test]
    fn test_minutes_and_hours() {
        assert_eq!(format_distance(60), "1m");
        assert_eq!(format_distance(59 * 60 + 59), "59m");
        assert_eq!(format_distance(3600), "1h");
        assert_eq!(format_distance(23 * 3600), "23h");
    }

    #[test]
    fn test_days_weeks_months_years() {
        assert_eq!(format_distance(86_400), "1d");
        assert_eq!(format_distance(6 * 86_400), "6d");
        assert_eq!(format_distance(7 * 86_400), "1w");
        assert_eq!(format_distance(34 * 86_400), "4w");
        assert_eq!(format_distance(35 * 86_400), "1mo");
        assert_eq!(format_distance(350 * 86_400), "11mo");
        assert_eq!(format_distance(400 * 86_400), "1y");
    }

    #[test]
    fn test_future_timestamp_clamps_to_zero() {
        assert_eq!(format_distance(-30), "0s");
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(format_distance_to_now(future), "0s");
    }
}
