// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process periodic job scheduler.
//!
//! This crate provides:
//!
//! - **Schedules**: interchangeable due-time calculators — a fixed
//!   interval ([`Every`]) and a 5-field cron expression ([`Cron`])
//! - **Jobs**: a schedule bound to one or more tasks with run bookkeeping
//! - **Collectors**: pluggable job sources consulted on every tick
//! - **Scheduler**: a background tick loop that dispatches due jobs as
//!   fire-and-forget tokio tasks
//!
//! Best-effort, single-process, at-least-once-per-tick dispatch: nothing
//! is persisted, nothing is coordinated across processes, and dispatched
//! task bodies are never awaited.
//!
//! ```no_run
//! use chime::{every, Job, Scheduler};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo() -> chime::Result<()> {
//! let scheduler = Scheduler::new();
//! let job = Job::new(every(Duration::from_secs(300))?)
//!     .add_fn(|| async { println!("five minutes passed") });
//! scheduler.add_job(Arc::new(job));
//! scheduler.interval(Duration::from_secs(1)).start().await;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod error;
pub mod job;
pub mod schedule;
pub mod scheduler;

pub use collector::Collector;
pub use error::{Result, ScheduleError};
pub use job::{Job, Task};
pub use schedule::{every, Cron, Every, Schedule};
pub use scheduler::{Scheduler, DEFAULT_TICK_INTERVAL};
