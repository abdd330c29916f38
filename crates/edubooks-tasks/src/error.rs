//! Task errors

use edubooks_core::LibraryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
	#[error("Task execution failed: {0}")]
	ExecutionFailed(String),

	#[error("Task not found: {0}")]
	TaskNotFound(String),

	#[error("Invalid schedule '{expression}': {reason}")]
	InvalidSchedule { expression: String, reason: String },

	#[error(transparent)]
	Library(#[from] LibraryError),
}

pub type TaskResult<T> = Result<T, TaskError>;
