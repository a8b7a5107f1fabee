// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The scheduler: tick loop, due-job dispatch, and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::collector::{Collector, DefaultCollector};
use crate::job::Job;

/// Default gap between due-job scans.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

struct Inner {
	default_collector: DefaultCollector,
	collectors: Vec<Arc<dyn Collector>>,
	interval: Duration,
	timezone: Tz,
	running: bool,
	shutdown_tx: Option<broadcast::Sender<()>>,
	loop_handle: Option<JoinHandle<()>>,
}

/// An in-process periodic job scheduler.
///
/// One background tick loop scans registered collectors for due jobs and
/// dispatches each as a fire-and-forget tokio task. A single coarse lock
/// serializes configuration changes and the whole tick scan; dispatched
/// job bodies run outside it, with no ordering guarantee relative to each
/// other or to later ticks, no completion tracking, and no per-job
/// in-flight guard. A slow task can therefore overlap with its own next
/// dispatch.
///
/// Cloning is cheap and shares the same scheduler.
#[derive(Clone)]
pub struct Scheduler {
	inner: Arc<Mutex<Inner>>,
}

impl Scheduler {
	/// Create a stopped scheduler with a one-minute tick interval,
	/// evaluating schedules in UTC.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(Mutex::new(Inner {
				default_collector: DefaultCollector::default(),
				collectors: Vec::new(),
				interval: DEFAULT_TICK_INTERVAL,
				timezone: Tz::UTC,
				running: false,
				shutdown_tx: None,
				loop_handle: None,
			})),
		}
	}

	/// Register a job with the built-in collector. Allowed in any state.
	pub fn add_job(&self, job: Arc<Job>) {
		self.inner.lock().default_collector.add(job);
	}

	/// Register an additional collector.
	///
	/// A collector added while running is scanned from the next tick.
	pub fn add_collector(&self, collector: Arc<dyn Collector>) -> &Self {
		self.inner.lock().collectors.push(collector);
		self
	}

	/// Set the gap between due-job scans.
	///
	/// While running, the new interval applies once the currently armed
	/// tick fires.
	pub fn interval(&self, interval: Duration) -> &Self {
		self.inner.lock().interval = interval;
		self
	}

	/// Set the timezone schedules are evaluated in.
	///
	/// No-op unless the scheduler is running: a location set while
	/// stopped is silently discarded. Pinned by the lifecycle tests.
	pub fn location(&self, timezone: Tz) -> &Self {
		let mut inner = self.inner.lock();
		if inner.running {
			inner.timezone = timezone;
		}
		self
	}

	/// The timezone schedules are evaluated in.
	pub fn timezone(&self) -> Tz {
		self.inner.lock().timezone
	}

	/// Snapshot of the jobs in the built-in collector.
	pub fn jobs(&self) -> Vec<Arc<Job>> {
		self.inner.lock().default_collector.jobs()
	}

	/// Start the background tick loop. No-op if already running.
	pub async fn start(&self) {
		let mut inner = self.inner.lock();
		if inner.running {
			return;
		}
		let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
		inner.running = true;

		let state = Arc::clone(&self.inner);
		let handle = tokio::spawn(async move {
			loop {
				// Read fresh before arming each tick so interval changes
				// apply once the current tick fires.
				let interval = state.lock().interval;
				tokio::select! {
					_ = tokio::time::sleep(interval) => {
						run_pending(&state, Utc::now());
					}
					_ = shutdown_rx.recv() => {
						debug!("tick loop shutting down");
						break;
					}
				}
			}
		});

		inner.shutdown_tx = Some(shutdown_tx);
		inner.loop_handle = Some(handle);
		info!(interval_ms = inner.interval.as_millis() as u64, "scheduler started");
	}

	/// Stop the tick loop and wait for it to exit. No-op if stopped.
	///
	/// Returns only once the loop has terminated, so no tick scan runs
	/// after `stop()` returns. Job bodies already dispatched are neither
	/// awaited nor cancelled; an in-flight task outliving `stop()` is a
	/// documented limitation.
	pub async fn stop(&self) {
		let handle = {
			let mut inner = self.inner.lock();
			if !inner.running {
				return;
			}
			inner.running = false;
			if let Some(shutdown_tx) = inner.shutdown_tx.take() {
				let _ = shutdown_tx.send(());
			}
			inner.loop_handle.take()
		};

		if let Some(handle) = handle {
			let _ = handle.await;
		}
		info!("scheduler stopped");
	}
}

impl Default for Scheduler {
	fn default() -> Self {
		Self::new()
	}
}

/// One tick: scan every collector for due jobs under the scheduler lock.
fn run_pending(state: &Mutex<Inner>, now: DateTime<Utc>) {
	let inner = state.lock();
	let tz = inner.timezone;

	scan_collector(&inner.default_collector, now, tz);
	for collector in &inner.collectors {
		scan_collector(collector.as_ref(), now, tz);
	}
}

/// Evaluate one collector's jobs in order, dispatching the due ones.
///
/// Every job is evaluated; there is no early exit on the first future
/// job, so correctness never depends on a collector being sorted.
fn scan_collector(collector: &dyn Collector, now: DateTime<Utc>, tz: Tz) {
	for job in collector.jobs() {
		let Some(next_run) = job.prime(now, tz) else {
			warn!("schedule yielded no further occurrence; job left unevaluated");
			continue;
		};
		if next_run > now {
			continue;
		}

		debug!(due = %next_run, "dispatching job");
		let dispatched = Arc::clone(&job);
		tokio::spawn(async move {
			dispatched.run().await;
		});
		job.record_dispatch(now, tz);
	}
}
