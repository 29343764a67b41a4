//! One-shot CLI commands.

use std::path::Path;

use chrono::{DateTime, Utc};
use naspanel_config::{ConfigLoader, ConfigValidator};
use naspanel_cron::{CronError, CronGrammar, ScheduleGrammar};

/// Load and validate the configuration. Returns whether it is usable.
pub(crate) fn check_config(path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Checking {}", path.display());
    } else {
        println!("{} not found, checking defaults", path.display());
    }

    let config = ConfigLoader::load_or_default(path)?;
    let result = ConfigValidator::validate(&config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    let mut valid = result.is_valid();
    if let Err(e) = CronGrammar::from_timezone_name(&config.cron.timezone) {
        println!("error: cron.timezone: {}", e);
        valid = false;
    }

    if valid {
        println!("Configuration OK");
    }
    Ok(valid)
}

/// Print the next `count` fire times of `expr` in the configured time zone.
pub(crate) fn next_runs(
    config_path: &Path,
    expr: &str,
    count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(config_path)?;
    let grammar = CronGrammar::from_timezone_name(&config.cron.timezone)?;

    for run in upcoming_runs(&grammar, expr, Utc::now(), count)? {
        println!(
            "{}",
            run.with_timezone(&grammar.timezone())
                .format("%Y-%m-%d %H:%M:%S %Z")
        );
    }
    Ok(())
}

/// The next `count` fire instants of `expr` after `from`.
pub(crate) fn upcoming_runs(
    grammar: &dyn ScheduleGrammar,
    expr: &str,
    from: DateTime<Utc>,
    count: usize,
) -> Result<Vec<DateTime<Utc>>, CronError> {
    grammar
        .check(expr)
        .map_err(|reason| CronError::InvalidSchedule {
            expr: expr.to_string(),
            reason,
        })?;

    let mut runs = Vec::with_capacity(count);
    let mut cursor = from;
    while runs.len() < count {
        let Some(next) = grammar.next_fire_after(expr, cursor) else {
            break;
        };
        runs.push(next);
        cursor = next;
    }
    Ok(runs)
}
