//! # EduBooks
//!
//! Library management backend for a university: a book catalog, a loan
//! ledger with renewals, reservations, instructor reading lists, and a
//! penalty engine fed by a nightly overdue sweep.
//!
//! This facade re-exports the workspace crates:
//!
//! - [`core`]: domain records, errors, the loan policy and clocks
//! - [`auth`]: role-based capability checks
//! - [`db`]: the SQLite store and its query modules
//! - [`library`]: the circulation services
//! - [`conf`]: layered settings (feature `conf`)
//! - [`tasks`]: the maintenance scheduler (feature `tasks`)
//! - [`commands`]: the `edubooks-manage` commands (feature `commands`)
//!
//! ## Feature Flags
//!
//! - `full` (default) - everything below
//! - `conf` - TOML and environment settings
//! - `tasks` - cron scheduler and maintenance jobs
//! - `commands` - management CLI (implies `conf` and `tasks`)
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use edubooks::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let db = Database::connect("sqlite://edubooks.db", 5).await?;
//! db.migrate().await?;
//! let library = Library::new(db, LoanPolicy::default());
//!
//! let admin = library
//! 	.users()
//! 	.provision(NewUser::administrator("admin@uni.edu", "admin", "Circulation"))
//! 	.await?;
//! let report = library.sweep().run(&admin, SweepOptions::default()).await?;
//! println!("fined {} loan(s)", report.processed.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[cfg(feature = "commands")]
pub mod commands;
#[cfg(feature = "conf")]
pub mod conf;
pub mod core;
pub mod db;
pub mod library;
#[cfg(feature = "tasks")]
pub mod tasks;

pub use edubooks_core::{ErrorKind, LibraryError, Result};
pub use edubooks_library::Library;

/// Prelude module for convenient imports
pub mod prelude {
	pub use edubooks_auth::{Action, authorize};
	pub use edubooks_core::{
		Book, BookId, Clock, ErrorKind, LibraryError, Loan, LoanId, LoanPolicy, LoanStatus,
		NewBook, NewPenalty, NewUser, Penalty, PenaltyKind, PenaltyStatus, Reservation, Result,
		Role, User, UserId,
	};
	pub use edubooks_db::Database;
	pub use edubooks_library::prelude::*;

	#[cfg(feature = "conf")]
	pub use edubooks_conf::Settings;

	#[cfg(feature = "tasks")]
	pub use edubooks_tasks::prelude::*;
}
