//! Prelude module for convenient imports

pub use super::builder::{BuildError, GetError, MergedSettings, SettingsBuilder};
pub use super::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
pub use super::{
	DatabaseSettings, ENV_PREFIX, LoanSettings, LoggingSettings, Settings, SettingsError,
	SweepSettings,
};
