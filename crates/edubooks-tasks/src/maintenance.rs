//! Library maintenance jobs

use crate::{CronSchedule, Scheduler, Task, TaskExecutor, TaskId, TaskResult};
use async_trait::async_trait;
use edubooks_library::{Library, SweepOptions};
use std::sync::Arc;
use tracing::{info, warn};

/// Flags overdue loans and fines them
#[derive(Debug, Clone)]
pub struct OverdueSweepTask {
	id: TaskId,
	library: Library,
	options: SweepOptions,
}

impl OverdueSweepTask {
	pub fn new(library: Library, options: SweepOptions) -> Self {
		Self {
			id: TaskId::new(),
			library,
			options,
		}
	}

	pub fn options(&self) -> &SweepOptions {
		&self.options
	}
}

impl Task for OverdueSweepTask {
	fn id(&self) -> TaskId {
		self.id
	}

	fn name(&self) -> &str {
		"process_overdue_loans"
	}
}

#[async_trait]
impl TaskExecutor for OverdueSweepTask {
	async fn execute(&self) -> TaskResult<()> {
		let report = self.library.sweep().execute(self.options).await?;
		if report.has_failures() {
			warn!(
				task = self.name(),
				failures = report.failures.len(),
				"Scheduled sweep left loans unprocessed"
			);
		}
		Ok(())
	}
}

/// Cancels reservations whose expiry has passed
#[derive(Debug, Clone)]
pub struct ReservationExpiryTask {
	id: TaskId,
	library: Library,
}

impl ReservationExpiryTask {
	pub fn new(library: Library) -> Self {
		Self {
			id: TaskId::new(),
			library,
		}
	}
}

impl Task for ReservationExpiryTask {
	fn id(&self) -> TaskId {
		self.id
	}

	fn name(&self) -> &str {
		"expire_reservations"
	}
}

#[async_trait]
impl TaskExecutor for ReservationExpiryTask {
	async fn execute(&self) -> TaskResult<()> {
		self.library.reservations().expire_stale().await?;
		Ok(())
	}
}

/// Completes suspensions whose end has passed
#[derive(Debug, Clone)]
pub struct SuspensionCompletionTask {
	id: TaskId,
	library: Library,
}

impl SuspensionCompletionTask {
	pub fn new(library: Library) -> Self {
		Self {
			id: TaskId::new(),
			library,
		}
	}
}

impl Task for SuspensionCompletionTask {
	fn id(&self) -> TaskId {
		self.id
	}

	fn name(&self) -> &str {
		"complete_suspensions"
	}
}

#[async_trait]
impl TaskExecutor for SuspensionCompletionTask {
	async fn execute(&self) -> TaskResult<()> {
		self.library.penalties().complete_elapsed_suspensions().await?;
		Ok(())
	}
}

/// Registers the sweep on `sweep_schedule` and both maintenance jobs on
/// `maintenance_schedule`
pub fn maintenance_scheduler(
	library: Library,
	sweep_schedule: &str,
	maintenance_schedule: &str,
	options: SweepOptions,
) -> TaskResult<Scheduler> {
	let sweep = CronSchedule::parse(sweep_schedule)?;
	let maintenance = CronSchedule::parse(maintenance_schedule)?;

	let mut scheduler = Scheduler::new();
	scheduler.add_task(
		Arc::new(OverdueSweepTask::new(library.clone(), options)),
		Box::new(sweep),
	);
	scheduler.add_task(
		Arc::new(ReservationExpiryTask::new(library.clone())),
		Box::new(maintenance.clone()),
	);
	scheduler.add_task(
		Arc::new(SuspensionCompletionTask::new(library)),
		Box::new(maintenance),
	);

	info!(
		sweep = sweep_schedule,
		maintenance = maintenance_schedule,
		"Maintenance tasks scheduled"
	);
	Ok(scheduler)
}
