//! Time-of-day values
//!
//! Task records historically carry two time representations: `"HH:MM"` strings and
//! legacy integer hour fields. [`TimeOfDay`] is the canonical value both normalize into;
//! resolution order is the explicit `"HH:MM"` field first, the legacy hour second, midnight last.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A local time of day, counted in minutes from midnight
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    minutes: u32,
}

impl TimeOfDay {
    /// Parses an `"HH:MM"` string. Returns `None` on missing or malformed input,
    /// so callers can fall back to a legacy hour field.
    pub fn from_hhmm(text: &str) -> Option<Self> {
        let mut parts = text.trim().splitn(2, ':');
        let hours: u32 = parts.next()?.parse().ok()?;
        let minutes: u32 = parts.next()?.parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self { minutes: hours * 60 + minutes })
    }

    /// A time on the hour, from a legacy integer hour field
    pub fn from_hour(hour: u32) -> Self {
        Self { minutes: hour.min(23) * 60 }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self { minutes: minutes.min(24 * 60 - 1) }
    }

    /// Resolves the two stored representations into one value:
    /// the explicit `"HH:MM"` field wins, then the legacy hour, then midnight.
    pub fn resolve(hhmm: Option<&str>, legacy_hour: Option<u32>) -> Self {
        hhmm.and_then(Self::from_hhmm)
            .or_else(|| legacy_hour.map(Self::from_hour))
            .unwrap_or(Self { minutes: 0 })
    }

    pub fn minutes(&self) -> u32 { self.minutes }

    /// The hour this time falls in (e.g. 9 for "09:30")
    pub fn hour_floor(&self) -> u32 { self.minutes / 60 }

    /// The first hour at or after this time (e.g. 11 for "10:45", 10 for "10:00")
    pub fn hour_ceil(&self) -> u32 { (self.minutes + 59) / 60 }
}

/// Convenience form of [`TimeOfDay::from_hhmm`] for callers that only need the offset
pub fn to_minutes(hhmm: &str) -> Option<u32> {
    TimeOfDay::from_hhmm(hhmm).map(|t| t.minutes())
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hhmm(s).ok_or_else(|| format!("Not a valid HH:MM time: {:?}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(to_minutes("00:00"), Some(0));
        assert_eq!(to_minutes("09:30"), Some(570));
        assert_eq!(to_minutes("23:59"), Some(1439));
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(to_minutes(""), None);
        assert_eq!(to_minutes("9"), None);
        assert_eq!(to_minutes("24:00"), None);
        assert_eq!(to_minutes("12:60"), None);
        assert_eq!(to_minutes("noon"), None);
    }

    #[test]
    fn resolution_order_prefers_the_explicit_field() {
        assert_eq!(TimeOfDay::resolve(Some("09:30"), Some(14)).minutes(), 570);
        // Malformed explicit field falls back to the legacy hour
        assert_eq!(TimeOfDay::resolve(Some("garbage"), Some(14)).minutes(), 14 * 60);
        assert_eq!(TimeOfDay::resolve(None, Some(14)).minutes(), 14 * 60);
        assert_eq!(TimeOfDay::resolve(None, None).minutes(), 0);
    }

    #[test]
    fn hour_rounding() {
        let t = TimeOfDay::from_hhmm("09:30").unwrap();
        assert_eq!(t.hour_floor(), 9);
        assert_eq!(t.hour_ceil(), 10);

        let on_the_hour = TimeOfDay::from_hhmm("10:00").unwrap();
        assert_eq!(on_the_hour.hour_floor(), 10);
        assert_eq!(on_the_hour.hour_ceil(), 10);
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(TimeOfDay::from_hhmm("08:05").unwrap().to_string(), "08:05");
    }
}
