//! # edubooks-core
//!
//! Domain layer shared by every EduBooks crate.
//!
//! ## Contents
//!
//! - `models`: `Book`, `Loan`, `Reservation`, `Penalty`, `Bibliography`, `User`
//!   and their creation/update payloads
//! - `ids`: strongly typed record identifiers
//! - `error`: the `LibraryError` taxonomy surfaced by every operation
//! - `policy`: `LoanPolicy` (loan period, renewal cap, reservation hold, daily fine)
//! - `clock`: the `Clock` abstraction used to read and mock wall-clock time
//!
//! ## Quick Start
//!
//! ```rust
//! use edubooks_core::{BookStatus, LoanPolicy};
//!
//! let policy = LoanPolicy::default();
//! assert_eq!(policy.fine_for(20), 100_000);
//!
//! // Status follows the availability counter unless manually overridden
//! assert_eq!(BookStatus::Available.reconcile(0), BookStatus::Loaned);
//! assert_eq!(BookStatus::Maintenance.reconcile(0), BookStatus::Maintenance);
//! ```

pub mod clock;
pub mod error;
pub mod ids;
pub mod models;
pub mod policy;

pub use clock::{Clock, MockClock, SystemClock};
pub use error::{ErrorKind, LibraryError, Result};
pub use ids::{BibliographyId, BookId, LoanId, PenaltyId, ReservationId, UserId};
pub use models::{
	Bibliography, BibliographyFilter, BibliographyUpdate, Book, BookFilter, BookStatus, BookUpdate, Loan, LoanStatus,
	NewBibliography, NewBook, NewPenalty, NewUser, Penalty, PenaltyKind, PenaltyStatus,
	ReadingList, Reservation, ReservationStatus, Role, User, UserFilter, UserUpdate,
};
pub use policy::LoanPolicy;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::clock::{Clock, MockClock, SystemClock};
	pub use crate::error::{ErrorKind, LibraryError, Result};
	pub use crate::ids::*;
	pub use crate::models::*;
	pub use crate::policy::LoanPolicy;
}
