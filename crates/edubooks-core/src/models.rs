//! Model definitions for the library domain
//!
//! This module contains the persisted records and their payloads:
//! - `Book`: catalog entry with availability counters
//! - `Loan`: a borrowed copy with due date and renewal count
//! - `Reservation`: per-book intent to borrow, held for a fixed period
//! - `Penalty`: fine or suspension attached to a user
//! - `Bibliography`: instructor-curated reading list
//! - `User`: account with a role and role-specific attributes

pub mod bibliography;
pub mod book;
pub mod loan;
pub mod penalty;
pub mod reservation;
pub mod user;

pub use bibliography::{
	Bibliography, BibliographyFilter, BibliographyUpdate, NewBibliography, ReadingList,
};
pub use book::{Book, BookFilter, BookStatus, BookUpdate, NewBook};
pub use loan::{Loan, LoanStatus};
pub use penalty::{NewPenalty, Penalty, PenaltyKind, PenaltyStatus};
pub use reservation::{Reservation, ReservationStatus};
pub use user::{NewUser, Role, User, UserFilter, UserUpdate};

/// Returns `true` when an optional text field holds something besides whitespace
pub(crate) fn is_present(value: Option<&str>) -> bool {
	value.is_some_and(|v| !v.trim().is_empty())
}
