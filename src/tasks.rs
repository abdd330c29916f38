//! Maintenance scheduler.
//!
//! ```rust,no_run
//! use edubooks::tasks::{CronSchedule, Scheduler};
//! ```

pub use edubooks_tasks::*;
