//! # edubooks-tasks
//!
//! Periodic maintenance for the circulation desk.
//!
//! A [`Task`] names a unit of work and a [`TaskExecutor`] runs it. The
//! [`Scheduler`] pairs executors with a [`Schedule`] (usually a
//! [`CronSchedule`]) and spawns each one on the tokio runtime when it falls
//! due, until [`Scheduler::shutdown`] is called.
//!
//! The library jobs live in [`maintenance`]:
//!
//! - [`OverdueSweepTask`]: the batch overdue sweep
//! - [`ReservationExpiryTask`]: cancels reservations past their expiry
//! - [`SuspensionCompletionTask`]: completes suspensions whose end has passed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edubooks_library::{Library, SweepOptions};
//! use edubooks_tasks::maintenance_scheduler;
//!
//! # async fn example(library: Library) -> edubooks_tasks::TaskResult<()> {
//! let scheduler = maintenance_scheduler(
//! 	library,
//! 	"0 0 2 * * *",
//! 	"0 0 * * * *",
//! 	SweepOptions::default(),
//! )?;
//! scheduler.run().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod maintenance;
pub mod scheduler;
pub mod task;

pub use error::{TaskError, TaskResult};
pub use maintenance::{
	OverdueSweepTask, ReservationExpiryTask, SuspensionCompletionTask, maintenance_scheduler,
};
pub use scheduler::{CronSchedule, Schedule, Scheduler};
pub use task::{Task, TaskExecutor, TaskId};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::error::{TaskError, TaskResult};
	pub use crate::scheduler::{CronSchedule, Schedule, Scheduler};
	pub use crate::task::{Task, TaskExecutor, TaskId};
}
