//! Elapsed-time arithmetic for records.
//!
//! Every span is measured in whole milliseconds, clamped at zero, and then
//! peeled into days, hours, minutes and seconds without any rounding.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: f64 = 3_600_000.0;
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Elapsed {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_hours: f64,
    pub total_minutes: i64,
}

/// How many units a formatted duration shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatPolicy {
    /// Largest non-zero unit followed by every smaller unit: `2d 3h 0m 5s`, `4m 10s`, `9s`.
    #[default]
    Detailed,
    /// Only the non-zero units among days, hours and minutes, minutes as fallback: `2d 3h`, `0m`.
    Compact,
}

/// Elapsed time between `start` and `end`, where a missing end means `now`.
pub fn elapsed_at(start: DateTime<Utc>, end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Elapsed {
    let end = end.unwrap_or(now);
    let millis = (end - start).num_milliseconds().max(0);
    Elapsed::from_millis(millis)
}

/// Breaks an aggregate hour figure back into whole units.
pub fn from_total_hours(total_hours: f64) -> Elapsed {
    if !total_hours.is_finite() || total_hours <= 0.0 {
        return Elapsed::default();
    }
    let millis = (total_hours * MS_PER_HOUR).round() as i64;
    Elapsed {
        total_hours,
        ..Elapsed::from_millis(millis)
    }
}

/// Coarse phrase for a total such as `45 total minutes`, `1.5 total hours` or `3.0 total days`.
pub fn total_phrase(total_hours: f64, total_minutes: i64) -> String {
    if total_hours < 1.0 {
        return format!("{total_minutes} total minute{}", plural(total_minutes == 1));
    }
    if total_hours < 48.0 {
        let hours = round_tenth(total_hours);
        return format!("{hours:.1} total hour{}", plural(hours == 1.0));
    }
    let days = round_tenth(total_hours / 24.0);
    format!("{days:.1} total day{}", plural(days == 1.0))
}

impl Elapsed {
    fn from_millis(millis: i64) -> Self {
        let millis = millis.max(0);
        let mut rest = millis / MS_PER_SECOND;

        let days = rest / SECONDS_PER_DAY;
        rest -= days * SECONDS_PER_DAY;
        let hours = rest / SECONDS_PER_HOUR;
        rest -= hours * SECONDS_PER_HOUR;
        let minutes = rest / SECONDS_PER_MINUTE;
        let seconds = rest - minutes * SECONDS_PER_MINUTE;

        Self {
            days,
            hours,
            minutes,
            seconds,
            total_hours: millis as f64 / MS_PER_HOUR,
            total_minutes: millis / MS_PER_MINUTE,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        self.days * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }

    pub fn format(&self, policy: FormatPolicy) -> String {
        match policy {
            FormatPolicy::Detailed => {
                if self.days > 0 {
                    format!("{}d {}h {}m {}s", self.days, self.hours, self.minutes, self.seconds)
                } else if self.hours > 0 {
                    format!("{}h {}m {}s", self.hours, self.minutes, self.seconds)
                } else if self.minutes > 0 {
                    format!("{}m {}s", self.minutes, self.seconds)
                } else {
                    format!("{}s", self.seconds)
                }
            }
            FormatPolicy::Compact => {
                let mut parts = Vec::with_capacity(3);
                if self.days > 0 {
                    parts.push(format!("{}d", self.days));
                }
                if self.hours > 0 {
                    parts.push(format!("{}h", self.hours));
                }
                if self.minutes > 0 || parts.is_empty() {
                    parts.push(format!("{}m", self.minutes));
                }
                parts.join(" ")
            }
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(FormatPolicy::Detailed))
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn plural(singular: bool) -> &'static str {
    if singular { "" } else { "s" }
}
