//! Tracing subscriber setup for the binary

use crate::{CommandError, CommandResult};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Directive for `verbosity`, or `None` to keep the configured filter
fn verbosity_directive(verbosity: u8) -> Option<&'static str> {
	match verbosity {
		0 => None,
		1 => Some("debug"),
		_ => Some("trace"),
	}
}

/// Builds the filter: `RUST_LOG` wins, then `-v`, then the settings default
pub fn filter_for(default_filter: &str, verbosity: u8) -> CommandResult<EnvFilter> {
	if let Ok(filter) = EnvFilter::try_from_default_env() {
		return Ok(filter);
	}
	let directive = verbosity_directive(verbosity).unwrap_or(default_filter);
	EnvFilter::try_new(directive)
		.map_err(|e| CommandError::InvalidArguments(format!("bad log filter '{directive}': {e}")))
}

/// Installs a global fmt subscriber
pub fn init_logging(default_filter: &str, verbosity: u8) -> CommandResult<()> {
	let filter = filter_for(default_filter, verbosity)?;
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_target(false))
		.try_init()
		.map_err(|e| CommandError::ExecutionError(format!("logging already initialised: {e}")))
}
