//! # edubooks-library
//!
//! Services of the EduBooks circulation desk.
//!
//! A [`Library`] bundles the database, the [`LoanPolicy`] and a [`Clock`].
//! Each concern is reached through a short-lived service borrowed from it:
//!
//! - [`Library::catalog`]: books, search and availability
//! - [`Library::loans`]: the loan ledger (create, return, renew)
//! - [`Library::reservations`]: holds on books
//! - [`Library::penalties`]: fines, suspensions and the sanction dashboard
//! - [`Library::sweep`]: the batch overdue sweep
//! - [`Library::reading_lists`]: instructor bibliographies
//! - [`Library::users`]: the user directory
//! - [`Library::statistics`]: circulation overview
//!
//! Every operation takes the acting [`User`] first and runs through
//! [`edubooks_auth::authorize`] before it touches the store. Mutations run in
//! a single transaction, so the book availability counter and the record that
//! moved it commit together.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edubooks_core::{LoanPolicy, Result, User, BookId};
//! use edubooks_db::Database;
//! use edubooks_library::Library;
//!
//! # async fn example(student: &User) -> Result<()> {
//! let db = Database::connect("sqlite://edubooks.db", 5).await?;
//! let library = Library::new(db, LoanPolicy::default());
//!
//! let loan = library.loans().create(student, BookId(1), student.id).await?;
//! println!("due on {}", loan.due_date);
//! # Ok(())
//! # }
//! ```
//!
//! [`LoanPolicy`]: edubooks_core::LoanPolicy
//! [`Clock`]: edubooks_core::Clock
//! [`User`]: edubooks_core::User

pub mod catalog;
pub mod library;
pub mod loans;
pub mod penalties;
pub mod reading_lists;
pub mod reservations;
pub mod statistics;
pub mod sweep;
pub mod users;

pub use catalog::{BookDetail, Catalog, CatalogLoad};
pub use library::Library;
pub use loans::{LoanReturn, Loans};
pub use penalties::{PenaltyDashboard, Penalties};
pub use reading_lists::ReadingLists;
pub use reservations::Reservations;
pub use statistics::{Overview, Statistics};
pub use sweep::{ProcessedLoan, SkippedLoan, Sweep, SweepFailure, SweepOptions, SweepReport};
pub use users::{Users, UserStatistics};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::library::Library;
	pub use crate::loans::LoanReturn;
	pub use crate::sweep::{SweepOptions, SweepReport};
}
