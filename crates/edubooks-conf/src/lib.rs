//! # EduBooks Configuration
//!
//! Layered settings for the library backend.
//!
//! Values are collected from several [`ConfigSource`](settings::sources::ConfigSource)s,
//! merged in priority order (environment variables > TOML file > defaults) and
//! deserialized into the typed [`Settings`].
//!
//! ## Quick Start
//!
//! ```rust
//! use edubooks_conf::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.loans.loan_days, 15);
//! assert_eq!(settings.loan_policy().daily_fine, 5000);
//! ```
//!
//! ## Environment variables
//!
//! Variables prefixed with `EDUBOOKS_` override file values. A double
//! underscore separates sections, so `EDUBOOKS_LOANS__DAILY_FINE=7000`
//! sets `loans.daily_fine`.
//!
//! ## Module Organization
//!
//! - [`settings`]: typed settings, sources and the merging builder

pub mod settings;

pub use settings::builder::{BuildError, GetError, MergedSettings, SettingsBuilder};
pub use settings::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
pub use settings::{
	DatabaseSettings, LoanSettings, LoggingSettings, Settings, SettingsError, SweepSettings,
};
