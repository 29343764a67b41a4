//! Cron schedule grammar.
//!
//! Accepted forms:
//! - five fields: `minute hour day-of-month month day-of-week` (seconds = 0)
//! - six fields: `second minute hour day-of-month month day-of-week`
//!
//! Numeric weekdays follow POSIX cron (`0` and `7` are Sunday). Month and
//! weekday names (`JAN`, `MON-FRI`) are accepted. Expressions are evaluated in
//! a fixed time zone.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::error::CronError;

/// Validation and next-fire computation for schedule expressions.
pub trait ScheduleGrammar: Send + Sync {
    /// Check `expr`, returning the reason it is rejected.
    fn check(&self, expr: &str) -> Result<(), String>;

    fn validate(&self, expr: &str) -> bool {
        self.check(expr).is_ok()
    }

    /// First fire instant strictly after `from`, or `None` if the expression
    /// is invalid or never fires again.
    fn next_fire_after(&self, expr: &str, from: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// [`ScheduleGrammar`] backed by the `cron` crate.
#[derive(Debug, Clone, Copy)]
pub struct CronGrammar {
    timezone: Tz,
}

impl CronGrammar {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Build a grammar from an IANA time zone name such as `Europe/Warsaw`.
    pub fn from_timezone_name(name: &str) -> Result<Self, CronError> {
        let timezone =
            Tz::from_str(name.trim()).map_err(|_| CronError::InvalidTimezone(name.to_string()))?;
        Ok(Self::new(timezone))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn parse(&self, expr: &str) -> Result<Schedule, String> {
        let normalized = normalize(expr)?;
        Schedule::from_str(&normalized).map_err(|e| e.to_string())
    }
}

impl Default for CronGrammar {
    fn default() -> Self {
        Self::new(chrono_tz::UTC)
    }
}

impl ScheduleGrammar for CronGrammar {
    fn check(&self, expr: &str) -> Result<(), String> {
        self.parse(expr).map(|_| ())
    }

    fn next_fire_after(&self, expr: &str, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let schedule = self.parse(expr).ok()?;
        schedule
            .after(&from.with_timezone(&self.timezone))
            .next()
            .map(|next| next.with_timezone(&Utc))
    }
}

const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Numeric bounds for the second..month fields of the six-field form.
const FIELD_RANGES: [(&str, u32, u32); 5] = [
    ("second", 0, 59),
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("day-of-month", 1, 31),
    ("month", 1, 12),
];

/// Rewrite `expr` into the six-field form the `cron` crate parses.
pub(crate) fn normalize(expr: &str) -> Result<String, String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    let mut fields: Vec<String> = match fields.len() {
        5 => std::iter::once("0")
            .chain(fields)
            .map(str::to_string)
            .collect(),
        6 => fields.into_iter().map(str::to_string).collect(),
        n => return Err(format!("expected 5 or 6 fields, found {}", n)),
    };

    for (field, (name, min, max)) in fields.iter().zip(FIELD_RANGES) {
        check_field_range(field, name, min, max)?;
    }
    fields[5] = normalize_weekdays(&fields[5])?;

    Ok(fields.join(" "))
}

fn check_field_range(field: &str, name: &str, min: u32, max: u32) -> Result<(), String> {
    for item in field.split(',') {
        let (base, step) = match item.split_once('/') {
            Some((base, step)) => (base, Some(step)),
            None => (item, None),
        };
        if let Some(step) = step {
            if step.parse::<u32>().map_or(true, |s| s == 0) {
                return Err(format!("invalid {} step '{}'", name, step));
            }
        }
        for part in base.split('-') {
            if let Ok(n) = part.parse::<u32>() {
                if n < min || n > max {
                    return Err(format!(
                        "{} value {} out of range ({}-{})",
                        name, n, min, max
                    ));
                }
            }
        }
    }
    Ok(())
}

fn normalize_weekdays(field: &str) -> Result<String, String> {
    let mut days: Vec<String> = Vec::new();
    for item in field.split(',') {
        for day in normalize_weekday_item(item)?.split(',') {
            if !days.iter().any(|d| d == day) {
                days.push(day.to_string());
            }
        }
    }
    Ok(days.join(","))
}

/// Map POSIX weekday numbers to names. Names and wildcards pass through.
fn normalize_weekday_item(item: &str) -> Result<String, String> {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };
    let step_by = match step {
        Some(step) => step
            .parse::<usize>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| format!("invalid day-of-week step '{}'", step))?,
        None => 1,
    };
    let (start, end) = match base.split_once('-') {
        Some((start, end)) => (start, Some(end)),
        None => (base, None),
    };

    let Ok(start) = start.parse::<u32>() else {
        return Ok(item.to_string());
    };
    let end = match end {
        Some(end) => match end.parse::<u32>() {
            Ok(end) => end,
            Err(_) => return Ok(item.to_string()),
        },
        None if step.is_some() => 6,
        None => start,
    };

    if start > 7 || end > 7 {
        return Err(format!("day-of-week value out of range (0-7): {}", item));
    }
    if start > end {
        return Err(format!("invalid day-of-week range: {}", item));
    }

    let days: Vec<&str> = (start..=end)
        .step_by(step_by)
        .map(|n| WEEKDAYS[(n % 7) as usize])
        .collect();
    Ok(days.join(","))
}

#[cfg(test)]
#[path = "grammar_tests.rs"]
mod tests;
