// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schedule capabilities: fixed intervals and cron expressions.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::{Result, ScheduleError};

/// Computes the next due time from a reference time.
///
/// Implementations must be pure and must return a time strictly after
/// `after` whenever they return `Some`; the tick loop relies on this for
/// forward progress. The timezone is the scheduler's configured location,
/// threaded through so wall-clock schedules evaluate in the right zone.
///
/// `None` means the schedule has no further occurrence. [`Every`] never
/// returns `None`; a cron schedule theoretically can once the year range
/// supported by the parser is exhausted.
pub trait Schedule: Send + Sync {
	/// Next due time after `after`, in UTC.
	fn next(&self, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>>;
}

/// Fixed-interval schedule: due every `interval` after the reference time.
#[derive(Debug, Clone)]
pub struct Every {
	interval: Duration,
}

impl Every {
	/// Create a fixed-interval schedule.
	///
	/// Fails with [`ScheduleError::InvalidInterval`] if the interval is
	/// zero or too large to represent.
	pub fn new(interval: std::time::Duration) -> Result<Self> {
		if interval.is_zero() {
			return Err(ScheduleError::InvalidInterval);
		}
		let interval = Duration::from_std(interval).map_err(|_| ScheduleError::InvalidInterval)?;
		Ok(Self { interval })
	}
}

impl Schedule for Every {
	fn next(&self, after: DateTime<Utc>, _tz: Tz) -> Option<DateTime<Utc>> {
		Some(after + self.interval)
	}
}

/// Shorthand for [`Every::new`].
pub fn every(interval: std::time::Duration) -> Result<Every> {
	Every::new(interval)
}

/// A schedule driven by a standard 5-field Unix cron expression.
///
/// The expression is parsed at construction; evaluation converts the
/// reference time into the scheduler's timezone, finds the next matching
/// wall-clock occurrence, and converts it back to UTC.
#[derive(Debug, Clone)]
pub struct Cron {
	schedule: cron::Schedule,
}

impl Cron {
	/// Parse a standard 5-field Unix cron expression
	/// (minute hour day-of-month month day-of-week).
	///
	/// Fails with [`ScheduleError::InvalidCronExpression`] if the
	/// expression does not parse.
	pub fn parse(expression: &str) -> Result<Self> {
		let field_count = expression.split_whitespace().count();
		if field_count != 5 {
			return Err(ScheduleError::InvalidCronExpression(format!(
				"expected 5 fields, got {field_count}"
			)));
		}

		// The cron crate expects the 7-field format:
		// second minute hour day-of-month month day-of-week year.
		// Fire at :00 of each matching minute, any year.
		let extended = format!("0 {expression} *");
		let schedule = cron::Schedule::from_str(&extended)
			.map_err(|e| ScheduleError::InvalidCronExpression(e.to_string()))?;
		Ok(Self { schedule })
	}
}

impl Schedule for Cron {
	fn next(&self, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
		let local_after = after.with_timezone(&tz);
		self.schedule
			.after(&local_after)
			.next()
			.map(|next| next.with_timezone(&Utc))
	}
}
