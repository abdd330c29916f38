//! Command errors

use edubooks_conf::SettingsError;
use edubooks_core::LibraryError;
use edubooks_tasks::TaskError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
	#[error("Command execution failed: {0}")]
	ExecutionError(String),

	#[error("Invalid arguments: {0}")]
	InvalidArguments(String),

	#[error("Cannot read fixture {path}: {source}")]
	Fixture {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Malformed fixture {path}: {source}")]
	MalformedFixture {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error(transparent)]
	Library(#[from] LibraryError),

	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error(transparent)]
	Task(#[from] TaskError),

	#[error(transparent)]
	Serialization(#[from] serde_json::Error),
}

pub type CommandResult<T> = Result<T, CommandError>;
