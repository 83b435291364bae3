use time::Weekday;

/// Working hours within one day, as minutes from midnight. `start < end <= 24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    start_minute: u16,
    end_minute: u16,
}

impl ShiftWindow {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self, &'static str> {
        if end_minute > Self::MINUTES_PER_DAY {
            return Err("Shift must end by 24:00.");
        }
        if start_minute >= end_minute {
            return Err("Shift must end after it starts.");
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// Parse `"HH:MM"` start and end times.
    pub fn parse(start: &str, end: &str) -> Result<Self, &'static str> {
        Self::new(parse_clock(start)?, parse_clock(end)?)
    }

    pub fn start_minute(&self) -> u16 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u16 {
        self.end_minute
    }
}

fn parse_clock(s: &str) -> Result<u16, &'static str> {
    let (h, m) = s.trim().split_once(':').ok_or("Time must be HH:MM.")?;
    let h: u16 = h.parse().map_err(|_| "Time must be HH:MM.")?;
    let m: u16 = m.parse().map_err(|_| "Time must be HH:MM.")?;
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return Err("Time must be HH:MM.");
    }
    Ok(h * 60 + m)
}

/// Render minutes from midnight as `HH:MM`.
pub fn format_clock(minute: i64) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Weekday stored as ISO number, Monday = 1 .. Sunday = 7.
pub fn weekday_number(day: Weekday) -> i64 {
    day.number_from_monday() as i64
}

/// Inverse of `weekday_number`. `None` outside 1..=7.
pub fn weekday_from_number(n: i64) -> Option<Weekday> {
    let day = match n {
        1 => Weekday::Monday,
        2 => Weekday::Tuesday,
        3 => Weekday::Wednesday,
        4 => Weekday::Thursday,
        5 => Weekday::Friday,
        6 => Weekday::Saturday,
        7 => Weekday::Sunday,
        _ => return None,
    };
    Some(day)
}

/// Short Japanese label for a weekday.
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "月",
        Weekday::Tuesday => "火",
        Weekday::Wednesday => "水",
        Weekday::Thursday => "木",
        Weekday::Friday => "金",
        Weekday::Saturday => "土",
        Weekday::Sunday => "日",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clock_times() {
        let w = ShiftWindow::parse("09:30", "18:00").unwrap();
        assert_eq!(w.start_minute(), 570);
        assert_eq!(w.end_minute(), 1080);
        assert!(ShiftWindow::parse("00:00", "24:00").is_ok());
    }

    #[test]
    fn rejects_inverted_and_out_of_range() {
        assert!(ShiftWindow::parse("18:00", "09:00").is_err());
        assert!(ShiftWindow::parse("10:00", "10:00").is_err());
        assert!(ShiftWindow::parse("10:00", "24:30").is_err());
        assert!(ShiftWindow::parse("9", "10:00").is_err());
        assert!(ShiftWindow::parse("09:60", "10:00").is_err());
    }

    #[test]
    fn weekday_numbers_round_trip_iso() {
        assert_eq!(weekday_number(Weekday::Monday), 1);
        assert_eq!(weekday_number(Weekday::Sunday), 7);
        assert_eq!(weekday_from_number(3), Some(Weekday::Wednesday));
        assert_eq!(weekday_from_number(0), None);
        assert_eq!(weekday_from_number(8), None);
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(570), "09:30");
        assert_eq!(format_clock(1440), "24:00");
    }
}
