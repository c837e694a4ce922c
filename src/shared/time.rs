use std::{
    fmt::Display,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Latest representable instant, used as "not reached".
pub const MAX: Time = Time(u32::MAX);
/// Earliest representable instant.
pub const MIN: Time = Time(0);

/// An instant measured in seconds from the start of the service day.
///
/// Service days may run past midnight, so values above `24:00:00` are valid
/// and common for late night trips.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<NaiveTime> for Time {
    fn from(value: NaiveTime) -> Self {
        Self(value.num_seconds_from_midnight())
    }
}

/// Saturates at zero, an instant is never "before" another by a negative span.
impl Sub<Time> for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 = self.0.saturating_add(rhs.0)
    }
}

impl Sub<Duration> for Time {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign<Duration> for Time {
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 = self.0.saturating_sub(rhs.0)
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == MAX {
            return f.write_str("--:--:--");
        }
        f.write_str(&self.to_hms_string())
    }
}

impl Time {
    /// Current wall clock time as seconds since local midnight.
    pub fn now() -> Self {
        Local::now().time().into()
    }

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_hm(hours: u32, minutes: u32) -> Self {
        Self(hours * 3600 + minutes * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    /// Parses `HH:MM:SS`. Hours are not capped at 24.
    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: u32 = 60 * 60;
        const MINUTE_TO_SEC: u32 = 60;
        let mut split = time.trim().split(':');
        let hours: u32 = split.next()?.parse().ok()?;
        let minutes: u32 = split.next()?.parse().ok()?;
        let seconds: u32 = split.next()?.parse().ok()?;
        if split.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }
        Some(Self(hours * HOUR_TO_SEC + minutes * MINUTE_TO_SEC + seconds))
    }
}

#[test]
fn parse_unparse() {
    for time in ["00:00:00", "00:00:30", "00:30:00", "12:30:30", "25:10:00"] {
        let stime = Time::from_hms(time).unwrap();
        assert_eq!(time, stime.to_hms_string())
    }
}

#[test]
fn valid_time_test() {
    assert_eq!(Time::from_hms("00:01:30").unwrap().as_seconds(), 90);
    assert_eq!(Time::from_hms("01:01:30").unwrap().as_seconds(), 3690);
    assert_eq!(Time::from_hms("24:00:01").unwrap().as_seconds(), 86_401);
}

#[test]
fn invalid_time_test() {
    assert!(Time::from_hms("00:00:0a").is_none());
    assert!(Time::from_hms("00:00").is_none());
    assert!(Time::from_hms("00:61:00").is_none());
    assert!(Time::from_hms("00:00:00:00").is_none());
}

#[test]
fn saturating_time_test() {
    let early = Time::from_seconds(10);
    let late = Time::from_seconds(30);
    assert_eq!(late - early, Duration::from_seconds(20));
    assert_eq!(early - late, Duration::ZERO);
    assert_eq!(MAX + Duration::from_seconds(1), MAX);
}

/// A non-negative span of time in seconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Duration(u32);

impl From<u32> for Duration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        std::time::Duration::from_secs(value.0 as u64)
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours * 60 * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.0 / 60;
        let s = self.0 % 60;
        if m == 0 {
            write!(f, "{s}s")
        } else if s == 0 {
            write!(f, "{m}m")
        } else {
            write!(f, "{m}m{s}s")
        }
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0)
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0)
    }
}
