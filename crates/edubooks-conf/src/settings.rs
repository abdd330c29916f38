//! Typed settings and their layered loading

pub mod builder;
pub mod prelude;
pub mod sources;

use builder::{BuildError, SettingsBuilder};
use edubooks_core::LoanPolicy;
use edubooks_core::policy::{
	DEFAULT_DAILY_FINE, DEFAULT_LOAN_DAYS, DEFAULT_MAX_RENEWALS, DEFAULT_RESERVATION_DAYS,
	MAX_PERIOD_DAYS,
};
use serde::{Deserialize, Serialize};
use sources::{DefaultSource, EnvSource, TomlFileSource};
use std::path::Path;

/// Prefix of environment variables read by [`Settings::load`]
pub const ENV_PREFIX: &str = "EDUBOOKS_";

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error(transparent)]
	Build(#[from] BuildError),
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
	#[serde(default)]
	pub database: DatabaseSettings,

	#[serde(default)]
	pub loans: LoanSettings,

	#[serde(default)]
	pub sweep: SweepSettings,

	#[serde(default)]
	pub logging: LoggingSettings,
}

/// Store connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
	/// SQLite URL, e.g. `sqlite://edubooks.db` or `sqlite::memory:`
	pub url: String,
	pub max_connections: u32,
}

impl Default for DatabaseSettings {
	fn default() -> Self {
		Self {
			url: "sqlite://edubooks.db".to_string(),
			max_connections: 5,
		}
	}
}

/// Loan lifecycle rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanSettings {
	pub loan_days: u32,
	pub max_renewals: i32,
	pub reservation_days: u32,
	pub daily_fine: i64,
}

impl Default for LoanSettings {
	fn default() -> Self {
		Self {
			loan_days: DEFAULT_LOAN_DAYS,
			max_renewals: DEFAULT_MAX_RENEWALS,
			reservation_days: DEFAULT_RESERVATION_DAYS,
			daily_fine: DEFAULT_DAILY_FINE,
		}
	}
}

impl From<LoanSettings> for LoanPolicy {
	fn from(settings: LoanSettings) -> Self {
		Self {
			loan_days: settings.loan_days,
			max_renewals: settings.max_renewals,
			reservation_days: settings.reservation_days,
			daily_fine: settings.daily_fine,
		}
	}
}

/// Overdue sweep and maintenance schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
	/// Days past the due date before a loan counts as overdue
	pub grace_days: u32,
	/// Window for the "due soon" listing
	pub upcoming_window_days: u32,
	/// Cron expression (with seconds) for the overdue sweep
	pub schedule: String,
	/// Cron expression for reservation expiry and suspension completion
	pub maintenance_schedule: String,
}

impl Default for SweepSettings {
	fn default() -> Self {
		Self {
			grace_days: 0,
			upcoming_window_days: 3,
			schedule: "0 0 2 * * *".to_string(),
			maintenance_schedule: "0 0 * * * *".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// `tracing_subscriber::EnvFilter` directive
	pub filter: String,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			filter: "info,sqlx=warn".to_string(),
		}
	}
}

impl Settings {
	/// Loads defaults, then `path` (when given and present), then `EDUBOOKS_*` variables
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let mut builder = SettingsBuilder::new().add_source(Self::default_source());
		if let Some(path) = path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		let settings: Self = builder
			.add_source(EnvSource::new().with_prefix(ENV_PREFIX))
			.build()?
			.into_typed()?;
		settings.validate()?;
		tracing::debug!(database = %settings.database.url, "Settings loaded");
		Ok(settings)
	}

	/// Defaults as a configuration source
	pub fn default_source() -> DefaultSource {
		let mut source = DefaultSource::new();
		let defaults = Self::default();
		// Serialization of plain structs cannot fail
		if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(&defaults) {
			for (key, value) in map {
				source = source.with_value(key, value);
			}
		}
		source
	}

	pub fn loan_policy(&self) -> LoanPolicy {
		self.loans.into()
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.database.url.trim().is_empty() {
			return Err(SettingsError::ValidationError(
				"database.url must not be empty".to_string(),
			));
		}
		if self.database.max_connections == 0 {
			return Err(SettingsError::ValidationError(
				"database.max_connections must be at least 1".to_string(),
			));
		}
		if self.loans.loan_days == 0 {
			return Err(SettingsError::ValidationError(
				"loans.loan_days must be at least 1".to_string(),
			));
		}
		if self.loans.max_renewals < 0 {
			return Err(SettingsError::ValidationError(
				"loans.max_renewals must not be negative".to_string(),
			));
		}
		if self.loans.daily_fine <= 0 {
			return Err(SettingsError::ValidationError(
				"loans.daily_fine must be positive".to_string(),
			));
		}
		let periods = [
			("loans.loan_days", self.loans.loan_days),
			("loans.reservation_days", self.loans.reservation_days),
			("sweep.grace_days", self.sweep.grace_days),
			("sweep.upcoming_window_days", self.sweep.upcoming_window_days),
		];
		for (key, days) in periods {
			if days > MAX_PERIOD_DAYS {
				return Err(SettingsError::ValidationError(format!(
					"{key} must not exceed {MAX_PERIOD_DAYS} days"
				)));
			}
		}
		Ok(())
	}
}
