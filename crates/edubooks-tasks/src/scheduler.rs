//! Task scheduling

use crate::{TaskError, TaskExecutor, TaskResult};
use chrono::{DateTime, Utc};
use cron::Schedule as CronParser;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info};

/// Lower bound between two scheduler passes
const MIN_SLEEP: Duration = Duration::from_millis(100);

/// Pause when no task has a next run
const IDLE_SLEEP: Duration = Duration::from_secs(60);

/// When a task should run next
pub trait Schedule: Send + Sync {
	/// First run strictly after `after`, or `None` once the schedule is exhausted
	fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// Cron schedule with a seconds field
///
/// # Example
///
/// ```rust
/// use edubooks_tasks::CronSchedule;
///
/// // Every day at 02:00 UTC
/// let nightly = CronSchedule::parse("0 0 2 * * *").unwrap();
/// assert_eq!(nightly.expression(), "0 0 2 * * *");
///
/// assert!(CronSchedule::parse("whenever").is_err());
/// ```
#[derive(Clone)]
pub struct CronSchedule {
	expression: String,
	schedule: CronParser,
}

impl CronSchedule {
	pub fn parse(expression: &str) -> TaskResult<Self> {
		let schedule =
			CronParser::from_str(expression).map_err(|err| TaskError::InvalidSchedule {
				expression: expression.to_string(),
				reason: err.to_string(),
			})?;
		Ok(Self {
			expression: expression.to_string(),
			schedule,
		})
	}

	pub fn expression(&self) -> &str {
		&self.expression
	}
}

impl fmt::Debug for CronSchedule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CronSchedule")
			.field("expression", &self.expression)
			.finish()
	}
}

impl Schedule for CronSchedule {
	fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
		self.schedule.after(&after).next()
	}
}

/// Runs tasks when their schedule falls due
///
/// Each due execution is spawned on its own tokio task, so a slow sweep
/// never delays the maintenance jobs. Failures are logged and the task is
/// scheduled again.
pub struct Scheduler {
	tasks: Vec<(Arc<dyn TaskExecutor>, Box<dyn Schedule>)>,
	/// Latched: once set, every current and later `run` returns
	shutdown_tx: watch::Sender<bool>,
}

impl Scheduler {
	pub fn new() -> Self {
		let (shutdown_tx, _) = watch::channel(false);
		Self {
			tasks: Vec::new(),
			shutdown_tx,
		}
	}

	pub fn add_task(&mut self, task: Arc<dyn TaskExecutor>, schedule: Box<dyn Schedule>) {
		self.tasks.push((task, schedule));
	}

	/// Names of the registered tasks, in registration order
	pub fn task_names(&self) -> Vec<&str> {
		self.tasks.iter().map(|(task, _)| task.name()).collect()
	}

	pub fn len(&self) -> usize {
		self.tasks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tasks.is_empty()
	}

	/// Stops [`run`](Self::run), including a run that has not started yet
	///
	/// Executions already spawned finish on their own.
	pub fn shutdown(&self) {
		self.shutdown_tx.send_replace(true);
	}

	pub fn is_shut_down(&self) -> bool {
		*self.shutdown_tx.borrow()
	}

	/// Runs until [`shutdown`](Self::shutdown) is called
	pub async fn run(&self) {
		let mut shutdown_rx = self.shutdown_tx.subscribe();
		let started = Utc::now();
		let mut next_runs: Vec<Option<DateTime<Utc>>> = self
			.tasks
			.iter()
			.map(|(_, schedule)| schedule.next_after(started))
			.collect();
		info!(tasks = self.tasks.len(), "Scheduler started");

		loop {
			if *shutdown_rx.borrow_and_update() {
				info!("Scheduler stopped");
				break;
			}
			let now = Utc::now();

			for ((task, schedule), next_run) in self.tasks.iter().zip(next_runs.iter_mut()) {
				let Some(due) = *next_run else {
					continue;
				};
				if due > now {
					continue;
				}

				let task = Arc::clone(task);
				tokio::spawn(async move {
					debug!(task = task.name(), task_id = %task.id(), "Running scheduled task");
					if let Err(e) = task.execute().await {
						error!(task = task.name(), error = %e, "Task execution failed");
					}
				});
				*next_run = schedule.next_after(now);
			}

			let sleep_duration = match next_runs.iter().flatten().min() {
				Some(next) => (*next - now).to_std().unwrap_or(MIN_SLEEP).max(MIN_SLEEP),
				None => IDLE_SLEEP,
			};

			tokio::select! {
				_ = sleep(sleep_duration) => {}
				_ = shutdown_rx.changed() => {}
			}
		}
	}
}

impl Default for Scheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Scheduler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scheduler")
			.field("tasks", &self.task_names())
			.finish()
	}
}
