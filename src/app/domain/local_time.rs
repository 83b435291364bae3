//! Calendar input and display in the salon's local time (JST).

use time::{macros::format_description, Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Japan Standard Time. No daylight saving.
pub const LOCAL_OFFSET: UtcOffset = match UtcOffset::from_hms(9, 0, 0) {
    Ok(offset) => offset,
    Err(_) => UtcOffset::UTC,
};

/// Parse `YYYY-MM-DD` as produced by `<input type="date">`.
pub fn parse_iso_date(s: &str) -> Result<Date, &'static str> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| "Date must be YYYY-MM-DD.")
}

/// Combine a local date and optional `HH:MM` into an instant.
/// A blank time means the start of the day.
pub fn local_instant(date: Date, clock: &str) -> Result<OffsetDateTime, &'static str> {
    let time = match clock.trim() {
        "" => Time::MIDNIGHT,
        c => Time::parse(c, format_description!("[hour]:[minute]")).map_err(|_| "Time must be HH:MM.")?,
    };
    Ok(PrimitiveDateTime::new(date, time).assume_offset(LOCAL_OFFSET))
}

/// Today's date in local time.
pub fn today() -> Date {
    OffsetDateTime::now_utc().to_offset(LOCAL_OFFSET).date()
}

/// `YYYY-MM-DD HH:MM` in local time for a unix timestamp.
pub fn format_local(unix: i64) -> String {
    OffsetDateTime::from_unix_timestamp(unix)
        .ok()
        .and_then(|t| {
            t.to_offset(LOCAL_OFFSET)
                .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    #[test]
    fn parses_dates() {
        let d = parse_iso_date("2026-03-09").unwrap();
        assert_eq!(d.year(), 2026);
        assert_eq!(d.month(), Month::March);
        assert_eq!(d.day(), 9);
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse_iso_date("2026-02-30").is_err());
        assert!(parse_iso_date("2026-13-01").is_err());
        assert!(parse_iso_date("yesterday").is_err());
        assert!(parse_iso_date("2026-3-9").is_err());
        assert!(parse_iso_date("2026-03-09T10:00").is_err());
    }

    #[test]
    fn local_instant_is_jst() {
        let d = parse_iso_date("2026-01-01").unwrap();
        let t = local_instant(d, "09:00").unwrap();
        assert_eq!(t.to_offset(UtcOffset::UTC).hour(), 0);
        assert_eq!(format_local(t.unix_timestamp()), "2026-01-01 09:00");
    }

    #[test]
    fn blank_time_is_midnight() {
        let d = parse_iso_date("2026-01-01").unwrap();
        assert_eq!(format_local(local_instant(d, "").unwrap().unix_timestamp()), "2026-01-01 00:00");
        assert!(local_instant(d, "25:00").is_err());
        assert!(local_instant(d, "10:60").is_err());
        assert!(local_instant(d, "noon").is_err());
    }
}
