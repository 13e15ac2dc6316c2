//! ISO-8601 text forms for temporal property values.
//!
//! Dates, times and date-times round-trip through these strings. Durations
//! are rendered as a descriptive `PT…S` string only; callers must not rely
//! on decomposing it into calendar units.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

const TIME_FORMAT: &str = "%H:%M:%S%.f";
const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Local times render without an offset; zoned times append `±HH:MM`.
pub fn format_time(time: &NaiveTime, offset: Option<&FixedOffset>) -> String {
    let text = time.format(TIME_FORMAT).to_string();
    match offset {
        Some(offset) => format!("{text}{offset}"),
        None => text,
    }
}

pub fn format_local_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(LOCAL_DATETIME_FORMAT).to_string()
}

pub fn format_datetime(datetime: &DateTime<FixedOffset>) -> String {
    datetime.to_rfc3339()
}

/// Named-zone date-times use the bracketed zone suffix Neo4j itself prints.
pub fn format_zoned_datetime(datetime: &NaiveDateTime, zone: &str) -> String {
    format!("{}[{zone}]", format_local_datetime(datetime))
}

pub fn format_duration(duration: &Duration) -> String {
    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        return format!("PT{secs}S");
    }
    let fraction = format!("{nanos:09}");
    format!("PT{secs}.{}S", fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(1815, 6, 18).unwrap();
        assert_eq!(format_date(&date), "1815-06-18");
    }

    #[test]
    fn test_format_time_with_and_without_offset() {
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(format_time(&time, None), "09:30:00");

        let offset = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(format_time(&time, Some(&offset)), "09:30:00+01:00");
    }

    #[test]
    fn test_format_datetimes() {
        let local = NaiveDate::from_ymd_opt(1945, 8, 17)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(format_local_datetime(&local), "1945-08-17T10:00:00");
        assert_eq!(
            format_zoned_datetime(&local, "Asia/Jakarta"),
            "1945-08-17T10:00:00[Asia/Jakarta]"
        );

        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let zoned = local.and_local_timezone(offset).unwrap();
        assert_eq!(format_datetime(&zoned), "1945-08-17T10:00:00+07:00");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&Duration::from_secs(90)), "PT90S");
        assert_eq!(format_duration(&Duration::from_millis(1500)), "PT1.5S");
    }
}
