// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for schedule construction.

use thiserror::Error;

/// Result type for chime operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors surfaced when building schedules.
///
/// All failures are reported at construction time; nothing is deferred
/// into the tick loop.
#[derive(Debug, Error)]
pub enum ScheduleError {
	#[error("invalid cron expression: {0}")]
	InvalidCronExpression(String),

	#[error("schedule interval must be a positive duration")]
	InvalidInterval,
}
