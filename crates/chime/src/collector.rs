// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Job collectors: sources of jobs consulted on every tick.

use std::sync::Arc;

use crate::job::Job;

/// A source of jobs for the scheduler.
///
/// Consulted once per tick; the returned snapshot is evaluated in order.
/// Implementations may source jobs from anywhere (a static list, an
/// external registry). The built-in collector keeps jobs sorted by next
/// run time, but the tick scan does not depend on any collector being
/// sorted.
pub trait Collector: Send + Sync {
	/// Jobs to evaluate this tick, in evaluation order.
	fn jobs(&self) -> Vec<Arc<Job>>;
}

/// In-memory collector backing
/// [`Scheduler::add_job`](crate::Scheduler::add_job).
///
/// Kept sorted ascending by `next_run`, with unevaluated jobs first. The
/// whole list is re-sorted on insert; job counts are small enough that
/// simplicity beats an incremental structure.
#[derive(Default)]
pub(crate) struct DefaultCollector {
	jobs: Vec<Arc<Job>>,
}

impl DefaultCollector {
	pub(crate) fn add(&mut self, job: Arc<Job>) {
		self.jobs.push(job);
		// Option<DateTime> orders None first, which is exactly the
		// "unevaluated runs first" rule.
		self.jobs.sort_by_key(|job| job.next_run());
	}
}

impl Collector for DefaultCollector {
	fn jobs(&self) -> Vec<Arc<Job>> {
		self.jobs.clone()
	}
}
