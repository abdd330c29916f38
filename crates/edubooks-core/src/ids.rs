//! Typed identifiers for persisted records
//!
//! Every table uses an `INTEGER PRIMARY KEY`; the newtypes keep a `BookId`
//! from being passed where a `UserId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
		)]
		#[serde(transparent)]
		#[sqlx(transparent)]
		pub struct $name(pub i64);

		impl $name {
			pub fn new(value: i64) -> Self {
				Self(value)
			}

			pub fn get(self) -> i64 {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<i64> for $name {
			fn from(value: i64) -> Self {
				Self(value)
			}
		}

		impl From<$name> for i64 {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id!(
	/// Identifier of a catalog book
	BookId
);
define_id!(
	/// Identifier of a loan
	LoanId
);
define_id!(
	/// Identifier of a reservation
	ReservationId
);
define_id!(
	/// Identifier of a penalty
	PenaltyId
);
define_id!(
	/// Identifier of a reading list
	BibliographyId
);
define_id!(
	/// Identifier of a user account
	UserId
);
