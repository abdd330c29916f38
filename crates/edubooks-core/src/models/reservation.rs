use crate::error::{LibraryError, Result};
use crate::ids::{BookId, ReservationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReservationStatus {
	Active,
	Completed,
	Cancelled,
}

/// Persisted reservation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
	pub id: ReservationId,
	pub book_id: BookId,
	pub user_id: UserId,
	pub reserved_at: DateTime<Utc>,
	pub status: ReservationStatus,
	pub expires_at: DateTime<Utc>,
}

impl Reservation {
	/// Active and not yet expired at `now`
	pub fn is_live(&self, now: DateTime<Utc>) -> bool {
		self.status == ReservationStatus::Active && self.expires_at > now
	}

	pub fn cancel(&mut self) -> Result<()> {
		if self.status != ReservationStatus::Active {
			return Err(LibraryError::InvalidState(format!(
				"reservation {} is not active",
				self.id
			)));
		}
		self.status = ReservationStatus::Cancelled;
		Ok(())
	}
}
