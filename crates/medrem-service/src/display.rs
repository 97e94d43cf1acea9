//! Human-readable timestamp rendering for response DTOs.

use chrono::{DateTime, Utc};

/// Layout used for every timestamp in a response, e.g.
/// `2012-04-24 09:00:00 +0000 UTC`.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z %Z";

/// Render `ts` for display.
pub fn display_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_timestamp() {
        let ts = Utc.with_ymd_and_hms(2012, 4, 24, 9, 0, 0).unwrap();
        assert_eq!(display_timestamp(ts), "2012-04-24 09:00:00 +0000 UTC");
    }
}
