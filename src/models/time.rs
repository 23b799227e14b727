use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Wall-clock time of day at minute precision.
///
/// Wire format is `"HH:MM"` on a 24-hour clock, zero-padded so that the
/// lexicographic order of the wire strings matches chronological order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

/// Error returned when a time string cannot be parsed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid time of day '{input}': expected HH:MM on a 24-hour clock")]
pub struct TimeParseError {
    pub input: String,
}

impl TimeOfDay {
    /// Create a time from hour and minute components.
    ///
    /// Returns `None` when the components do not form a valid wall-clock time.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeOfDay)
    }

    /// Create a time from minutes counted from midnight.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::from_hm(minutes / 60, minutes % 60)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    /// Add a duration in minutes, refusing to wrap past midnight.
    pub fn checked_add_minutes(&self, minutes: u32) -> Option<Self> {
        let total = self.minutes_from_midnight() + minutes;
        if total >= 24 * 60 {
            return None;
        }
        Self::from_minutes(total)
    }

    /// Format on a 12-hour clock, dropping the minutes when they are zero.
    ///
    /// `07:00` renders as `"7 AM"`, `07:30` as `"7:30 AM"`.
    pub fn format_12h(&self) -> String {
        let (is_pm, hour12) = self.0.hour12();
        let meridiem = if is_pm { "PM" } else { "AM" };
        if self.minute() == 0 {
            format!("{} {}", hour12, meridiem)
        } else {
            format!("{}:{:02} {}", hour12, self.minute(), meridiem)
        }
    }
}

/// 12-hour display formatting for an optional time.
///
/// Returns an empty string when no time is present, matching the display
/// convention for blank grid cells.
pub fn format_time_12h(time: Option<TimeOfDay>) -> String {
    time.map(|t| t.format_12h()).unwrap_or_default()
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Accept a trailing seconds component, which some backend responses carry.
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(|t| TimeOfDay(t.with_second(0).unwrap_or(t)))
            .map_err(|_| TimeParseError {
                input: s.to_string(),
            })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{format_time_12h, TimeOfDay};

    fn t(s: &str) -> TimeOfDay {
        s.parse().expect("valid time literal")
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let time = t("07:30");
        assert_eq!(time.hour(), 7);
        assert_eq!(time.minute(), 30);
        assert_eq!(time.to_string(), "07:30");
    }

    #[test]
    fn test_parse_accepts_seconds_suffix() {
        assert_eq!(t("13:00:00"), t("13:00"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("7:xx".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_ordering_matches_wire_string_ordering() {
        let times = ["07:00", "07:30", "09:00", "13:30", "20:30"];
        for pair in times.windows(2) {
            assert!(t(pair[0]) < t(pair[1]));
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_minutes_from_midnight() {
        assert_eq!(t("00:00").minutes_from_midnight(), 0);
        assert_eq!(t("07:30").minutes_from_midnight(), 450);
        assert_eq!(t("21:00").minutes_from_midnight(), 1260);
    }

    #[test]
    fn test_checked_add_minutes() {
        assert_eq!(t("10:00").checked_add_minutes(90), Some(t("11:30")));
        assert_eq!(t("23:00").checked_add_minutes(59), Some(t("23:59")));
        assert_eq!(t("23:00").checked_add_minutes(60), None);
    }

    #[test]
    fn test_format_12h() {
        assert_eq!(t("07:00").format_12h(), "7 AM");
        assert_eq!(t("07:30").format_12h(), "7:30 AM");
        assert_eq!(t("12:00").format_12h(), "12 PM");
        assert_eq!(t("12:30").format_12h(), "12:30 PM");
        assert_eq!(t("00:00").format_12h(), "12 AM");
        assert_eq!(t("20:30").format_12h(), "8:30 PM");
    }

    #[test]
    fn test_format_time_12h_empty_for_none() {
        assert_eq!(format_time_12h(None), "");
        assert_eq!(format_time_12h(Some(t("09:00"))), "9 AM");
    }

    #[test]
    fn test_serde_wire_format() {
        let time = t("08:30");
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"08:30\"");

        let parsed: TimeOfDay = serde_json::from_str("\"16:00\"").unwrap();
        assert_eq!(parsed, t("16:00"));
    }

    #[test]
    fn test_from_minutes_bounds() {
        assert_eq!(TimeOfDay::from_minutes(450), Some(t("07:30")));
        assert_eq!(TimeOfDay::from_minutes(24 * 60), None);
    }
}
