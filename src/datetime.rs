//! Date/time utilities for buildmuc.

use chrono::Duration;

/// Format an elapsed time as a short human string ("5 mins", "2 hrs").
///
/// Negative durations (clock skew) are shown as "0 secs".
pub fn format_age(age: Duration) -> String {
    let secs = age.num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs} secs"),
        60..=3599 => format!("{} mins", secs / 60),
        3600..=86_399 => format!("{} hrs", secs / 3600),
        _ => format!("{} days", secs / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age_units() {
        assert_eq!(format_age(Duration::seconds(0)), "0 secs");
        assert_eq!(format_age(Duration::seconds(59)), "59 secs");
        assert_eq!(format_age(Duration::seconds(60)), "1 mins");
        assert_eq!(format_age(Duration::seconds(3599)), "59 mins");
        assert_eq!(format_age(Duration::hours(5)), "5 hrs");
        assert_eq!(format_age(Duration::days(3)), "3 days");
    }

    #[test]
    fn test_format_age_negative() {
        assert_eq!(format_age(Duration::seconds(-30)), "0 secs");
    }
}
