//! Compiles client-facing photo filters into Qdrant filter predicates.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use qdrant_client::qdrant::{Condition, Filter, Range};
use serde::{Deserialize, Serialize};

use crate::error::{PhotoError, PhotoResult};
use crate::payload::METADATA_TIMESTAMP;

/// First year covered by an on-this-day filter.
pub const ON_THIS_DAY_FIRST_YEAR: i32 = 2000;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Date constraints on a search or recommendation. All instants are epoch seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFilter {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,
    /// Exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<i64>,
    /// Any instant whose UTC month and day select the same date in every year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_this_day: Option<i64>,
}

impl PhotoFilter {
    pub fn between(not_before: Option<i64>, not_after: Option<i64>) -> Self {
        Self {
            not_before,
            not_after,
            on_this_day: None,
        }
    }

    pub fn on_this_day(instant: i64) -> Self {
        Self {
            on_this_day: Some(instant),
            ..Self::default()
        }
    }

    /// Rejects an `onThisDay` instant after next year, which would expand into one
    /// window per year up to that date.
    pub fn validate(&self) -> PhotoResult<()> {
        let Some(instant) = self.on_this_day else {
            return Ok(());
        };

        let latest = Utc::now().year() + 1;
        match DateTime::<Utc>::from_timestamp(instant, 0) {
            Some(reference) if reference.year() <= latest => Ok(()),
            _ => Err(PhotoError::Validation(format!(
                "onThisDay {} is later than year {}",
                instant, latest
            ))),
        }
    }
}

/// Compile a filter. `None` in, or a filter without any active predicate, compiles to `None`.
pub fn compile(filter: Option<&PhotoFilter>) -> Option<Filter> {
    let filter = filter?;

    let mut must = Vec::new();
    if filter.not_before.is_some() || filter.not_after.is_some() {
        must.push(timestamp_range(
            filter.not_before.map(|v| v as f64),
            filter.not_after.map(|v| v as f64),
        ));
    }

    let should = match filter.on_this_day {
        Some(instant) => on_this_day_windows(instant),
        None => Vec::new(),
    };

    if must.is_empty() && should.is_empty() {
        return None;
    }

    Some(Filter {
        must,
        should,
        ..Default::default()
    })
}

fn timestamp_range(gte: Option<f64>, lt: Option<f64>) -> Condition {
    Condition::range(
        METADATA_TIMESTAMP,
        Range {
            gte,
            lt,
            ..Default::default()
        },
    )
}

/// One day window per year from [`ON_THIS_DAY_FIRST_YEAR`] through the year after the
/// instant's year, so a "today" computed across a timezone boundary still matches.
fn on_this_day_windows(instant: i64) -> Vec<Condition> {
    let Some(reference) = DateTime::<Utc>::from_timestamp(instant, 0) else {
        tracing::warn!("On-this-day instant {} is out of range; ignoring", instant);
        return Vec::new();
    };
    tracing::trace!("Create filter for on-this-day {}", reference);

    (ON_THIS_DAY_FIRST_YEAR..=reference.year() + 1)
        .filter_map(|year| start_of_day(year, reference.month(), reference.day()))
        .map(|start| {
            let start = start as f64;
            timestamp_range(Some(start), Some(start + SECONDS_PER_DAY as f64))
        })
        .collect()
}

/// Midnight UTC of the given date; Feb 29 rolls over to Mar 1 in non-leap years.
fn start_of_day(year: i32, month: u32, day: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first| first.checked_add_days(chrono::Days::new(u64::from(day - 1))))
    })?;

    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}
