//! `MM:SS` formatting for the mini-player labels.

/// Format milliseconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_time(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parse `MM:SS` back to milliseconds; `0` when the text is malformed.
pub fn parse_time(text: &str) -> u64 {
    let Some((minutes, seconds)) = text.split_once(':') else {
        return 0;
    };
    match (minutes.parse::<u64>(), seconds.parse::<u64>()) {
        (Ok(minutes), Ok(seconds)) => minutes
            .saturating_mul(60)
            .saturating_add(seconds)
            .saturating_mul(1000),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(999), "00:00");
        assert_eq!(format_time(65_000), "01:05");
        assert_eq!(format_time(3_661_000), "61:01");
    }

    #[test]
    fn parses_well_formed_text() {
        assert_eq!(parse_time("01:05"), 65_000);
        assert_eq!(parse_time("61:01"), 3_661_000);
        assert_eq!(parse_time(&format_time(125_000)), 125_000);
    }

    #[test]
    fn seconds_past_a_minute_carry_over() {
        assert_eq!(parse_time("01:75"), 115_000);
        assert_eq!(parse_time("00:60"), 60_000);
    }

    #[test]
    fn malformed_text_is_zero() {
        assert_eq!(parse_time(""), 0);
        assert_eq!(parse_time("90"), 0);
        assert_eq!(parse_time("1:2:3"), 0);
        assert_eq!(parse_time("ab:10"), 0);
        assert_eq!(parse_time("-1:10"), 0);
    }
}
