use crate::error::{Error, Result};
use crate::github::issues::Issue;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Wire format of `updated_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn parse_updated_at(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| Error::Format {
            value: value.to_string(),
            source,
        })
}

/// Returns true iff the issue was last updated strictly before `now - delta_days`.
pub fn is_stale_at(issue: &Issue, delta_days: u32, now: DateTime<Utc>) -> Result<bool> {
    let updated_at = parse_updated_at(&issue.updated_at)?;
    // No representable cutoff means nothing can be older than it.
    match now.checked_sub_signed(Duration::days(i64::from(delta_days))) {
        Some(cutoff) => Ok(updated_at < cutoff),
        None => Ok(false),
    }
}
