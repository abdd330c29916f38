//! Command execution context

use crate::CommandResult;
use edubooks_conf::Settings;
use edubooks_db::Database;
use edubooks_library::Library;

/// Settings and an open library shared by every command
#[derive(Debug, Clone)]
pub struct CommandContext {
	library: Library,
	settings: Settings,
	verbosity: u8,
}

impl CommandContext {
	pub fn new(library: Library, settings: Settings) -> Self {
		Self {
			library,
			settings,
			verbosity: 0,
		}
	}

	/// Opens the database named in `settings`
	pub async fn connect(settings: Settings) -> CommandResult<Self> {
		let db = Database::connect(
			&settings.database.url,
			settings.database.max_connections,
		)
		.await?;
		let library = Library::new(db, settings.loan_policy());
		Ok(Self::new(library, settings))
	}

	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}

	pub fn library(&self) -> &Library {
		&self.library
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn verbosity(&self) -> u8 {
		self.verbosity
	}

	pub fn info(&self, message: &str) {
		println!("[INFO] {}", message);
	}

	pub fn success(&self, message: &str) {
		println!("[SUCCESS] {}", message);
	}

	pub fn warning(&self, message: &str) {
		eprintln!("[WARNING] {}", message);
	}

	/// Printed only with `-v`
	pub fn verbose(&self, message: &str) {
		if self.verbosity > 0 {
			println!("[VERBOSE] {}", message);
		}
	}
}
