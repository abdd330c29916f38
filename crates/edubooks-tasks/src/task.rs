//! Task identity and execution traits

use crate::TaskResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier of a task instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for TaskId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for TaskId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for TaskId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self)
	}
}

pub trait Task: Send + Sync {
	fn id(&self) -> TaskId;

	/// Stable name used in logs
	fn name(&self) -> &str;
}

/// A task that can be run by the [`Scheduler`](crate::Scheduler)
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use edubooks_tasks::{Task, TaskExecutor, TaskId, TaskResult};
///
/// struct Heartbeat {
/// 	id: TaskId,
/// }
///
/// impl Task for Heartbeat {
/// 	fn id(&self) -> TaskId {
/// 		self.id
/// 	}
///
/// 	fn name(&self) -> &str {
/// 		"heartbeat"
/// 	}
/// }
///
/// #[async_trait]
/// impl TaskExecutor for Heartbeat {
/// 	async fn execute(&self) -> TaskResult<()> {
/// 		Ok(())
/// 	}
/// }
/// ```
#[async_trait]
pub trait TaskExecutor: Task {
	async fn execute(&self) -> TaskResult<()>;
}
