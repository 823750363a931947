//! Human-readable renderings of sizes and timestamps for listings.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use std::time::SystemTime;

/// Format used for modification times, e.g. `3:45 PM on March 9, 2024`.
pub const DATE_FORMAT: &str = "%-I:%M %p on %B %-d, %Y";

/// Render a byte count as kilobytes with one fractional digit.
///
/// Rounds half up to the nearest tenth; a nonzero size never renders as
/// `0.0 kb`.
///
/// ```
/// use zipbrowse::format::render_size;
///
/// assert_eq!(render_size(0), "0.0 kb");
/// assert_eq!(render_size(12), "0.1 kb");
/// assert_eq!(render_size(900), "0.9 kb");
/// assert_eq!(render_size(1536), "1.5 kb");
/// ```
pub fn render_size(size: u64) -> String {
    let mut tenths = (u128::from(size) * 10 + 512) / 1024;
    if tenths == 0 && size > 0 {
        tenths = 1;
    }
    format!("{}.{} kb", tenths / 10, tenths % 10)
}

/// Render a timestamp in `tz` using [`DATE_FORMAT`].
pub fn render_date<Tz>(time: SystemTime, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::<Utc>::from(time)
        .with_timezone(tz)
        .format(DATE_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn sizes() {
        assert_eq!(render_size(1), "0.1 kb");
        assert_eq!(render_size(51), "0.1 kb");
        assert_eq!(render_size(1023), "1.0 kb");
        assert_eq!(render_size(1024), "1.0 kb");
        assert_eq!(render_size(10 * 1024 * 1024), "10240.0 kb");
        assert_eq!(render_size(u64::MAX), "18014398509481984.0 kb");
    }

    #[test]
    fn afternoon_date() {
        let time = SystemTime::from(Utc.with_ymd_and_hms(2024, 3, 9, 15, 45, 0).unwrap());
        assert_eq!(render_date(time, &Utc), "3:45 PM on March 9, 2024");
    }

    #[test]
    fn morning_date_pads_minutes() {
        let time = SystemTime::from(Utc.with_ymd_and_hms(2023, 12, 25, 0, 5, 59).unwrap());
        assert_eq!(render_date(time, &Utc), "12:05 AM on December 25, 2023");
    }

    #[test]
    fn date_follows_time_zone() {
        let time = SystemTime::from(Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap());
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(render_date(time, &east), "1:30 AM on March 10, 2024");
    }
}
