// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Jobs: a schedule bound to one or more tasks, plus run bookkeeping.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::error::Result;
use crate::schedule::{Cron, Schedule};

/// An opaque unit of work executed when its job comes due.
///
/// Bound arguments are closure (or struct field) captures, so callability
/// and arity are checked by the compiler at attachment; there is no
/// runtime binding error path.
#[async_trait]
pub trait Task: Send + Sync {
	async fn run(&self);
}

/// Adapter storing a closure-based task.
struct FnTask<F> {
	f: F,
}

#[async_trait]
impl<F> Task for FnTask<F>
where
	F: Fn() -> BoxFuture<'static, ()> + Send + Sync,
{
	async fn run(&self) {
		(self.f)().await;
	}
}

/// Run bookkeeping, updated only by the scheduler's tick scan.
#[derive(Debug, Clone, Copy, Default)]
struct RunTimes {
	last_run: Option<DateTime<Utc>>,
	next_run: Option<DateTime<Utc>>,
}

/// A schedule paired with the tasks it triggers.
///
/// Built with the builder pattern, then registered via
/// [`Scheduler::add_job`](crate::Scheduler::add_job) as an `Arc<Job>`. The
/// caller may keep a clone of the handle to observe run times; the
/// schedule must not be swapped out from under a running scheduler, which
/// the ownership model here makes impossible.
pub struct Job {
	schedule: Box<dyn Schedule>,
	tasks: Vec<Arc<dyn Task>>,
	times: Mutex<RunTimes>,
}

impl Job {
	/// Create a job from a schedule, with no run history.
	pub fn new(schedule: impl Schedule + 'static) -> Self {
		Self {
			schedule: Box::new(schedule),
			tasks: Vec::new(),
			times: Mutex::new(RunTimes::default()),
		}
	}

	/// Create a job from a standard 5-field cron expression.
	///
	/// Fails with `ScheduleError::InvalidCronExpression` if the
	/// expression does not parse.
	pub fn cron(expression: &str) -> Result<Self> {
		Ok(Self::new(Cron::parse(expression)?))
	}

	/// Attach a task.
	///
	/// Every attached task runs on each due evaluation, in attachment
	/// order.
	pub fn add_task(mut self, task: impl Task + 'static) -> Self {
		self.tasks.push(Arc::new(task));
		self
	}

	/// Attach a closure-based task. Arguments are bound by capture.
	pub fn add_fn<F, Fut>(self, f: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: std::future::Future<Output = ()> + Send + 'static,
	{
		self.add_task(FnTask {
			f: move || -> BoxFuture<'static, ()> { Box::pin(f()) },
		})
	}

	/// When the job last ran, if ever.
	pub fn last_run(&self) -> Option<DateTime<Utc>> {
		self.times.lock().last_run
	}

	/// When the job is next due, once the scheduler has evaluated it.
	pub fn next_run(&self) -> Option<DateTime<Utc>> {
		self.times.lock().next_run
	}

	/// Run every attached task, in attachment order.
	///
	/// Failures are not caught here: the dispatched tokio task is the
	/// failure domain, and bookkeeping is updated around the dispatch,
	/// never inside it.
	pub async fn run(&self) {
		for task in &self.tasks {
			task.run().await;
		}
	}

	/// Compute and store `next_run` if unset, returning the stored value.
	pub(crate) fn prime(&self, now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
		let mut times = self.times.lock();
		if times.next_run.is_none() {
			times.next_run = self.schedule.next(now, tz);
		}
		times.next_run
	}

	/// Advance bookkeeping after a dispatch: the due time becomes
	/// `last_run` and `next_run` is recomputed from `now`.
	pub(crate) fn record_dispatch(&self, now: DateTime<Utc>, tz: Tz) {
		let mut times = self.times.lock();
		times.last_run = times.next_run;
		times.next_run = self.schedule.next(now, tz);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schedule::Every;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	fn every_secs(secs: u64) -> Every {
		Every::new(Duration::from_secs(secs)).unwrap()
	}

	#[test]
	fn test_new_job_has_no_run_history() {
		let job = Job::new(every_secs(1));

		assert!(job.last_run().is_none());
		assert!(job.next_run().is_none());
	}

	#[test]
	fn test_cron_job_rejects_bad_expression() {
		assert!(Job::cron("not a cron").is_err());
		assert!(Job::cron("0 0 * * *").is_ok());
	}

	#[tokio::test]
	async fn test_run_executes_tasks_in_attachment_order() {
		let order = Arc::new(Mutex::new(Vec::new()));
		let first = Arc::clone(&order);
		let second = Arc::clone(&order);

		let job = Job::new(every_secs(1))
			.add_fn(move || {
				let order = Arc::clone(&first);
				async move {
					order.lock().push("first");
				}
			})
			.add_fn(move || {
				let order = Arc::clone(&second);
				async move {
					order.lock().push("second");
				}
			});

		job.run().await;

		assert_eq!(*order.lock(), vec!["first", "second"]);
	}

	struct CountingTask {
		count: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl Task for CountingTask {
		async fn run(&self) {
			self.count.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[tokio::test]
	async fn test_run_invokes_trait_tasks() {
		let count = Arc::new(AtomicUsize::new(0));
		let job = Job::new(every_secs(1)).add_task(CountingTask {
			count: Arc::clone(&count),
		});

		job.run().await;
		job.run().await;

		assert_eq!(count.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_prime_sets_next_run_strictly_future() {
		let job = Job::new(every_secs(60));
		let now = Utc::now();

		let next = job.prime(now, Tz::UTC).unwrap();
		assert!(next > now);

		// Priming again does not move the stored value.
		let again = job.prime(now + chrono::Duration::seconds(5), Tz::UTC).unwrap();
		assert_eq!(again, next);
	}

	#[test]
	fn test_record_dispatch_advances_bookkeeping() {
		let job = Job::new(every_secs(60));
		let now = Utc::now();

		let due = job.prime(now, Tz::UTC).unwrap();
		let later = now + chrono::Duration::seconds(60);
		job.record_dispatch(later, Tz::UTC);

		assert_eq!(job.last_run(), Some(due));
		assert_eq!(job.next_run(), Some(later + chrono::Duration::seconds(60)));
		assert!(job.next_run() >= job.last_run());
	}
}
