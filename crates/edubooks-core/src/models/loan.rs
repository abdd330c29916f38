//! Loan model and its state transitions

use crate::error::{LibraryError, Result};
use crate::ids::{BookId, LoanId, UserId};
use crate::policy::LoanPolicy;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LoanStatus {
	Active,
	Returned,
	Overdue,
}

impl LoanStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Returned => "returned",
			Self::Overdue => "overdue",
		}
	}
}

/// Persisted loan record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Loan {
	pub id: LoanId,
	pub book_id: BookId,
	pub user_id: UserId,
	pub borrowed_at: DateTime<Utc>,
	pub due_date: NaiveDate,
	pub returned_at: Option<DateTime<Utc>>,
	pub status: LoanStatus,
	pub renewals: i32,
	pub notes: Option<String>,
}

impl Loan {
	pub fn is_active(&self) -> bool {
		self.status == LoanStatus::Active
	}

	/// The copy is still out: active, or flagged overdue by the sweep
	pub fn is_outstanding(&self) -> bool {
		matches!(self.status, LoanStatus::Active | LoanStatus::Overdue)
	}

	pub fn ensure_active(&self) -> Result<()> {
		if self.is_active() {
			Ok(())
		} else {
			Err(LibraryError::InvalidState(format!(
				"loan {} is {}, not active",
				self.id,
				self.status.as_str()
			)))
		}
	}

	/// Checks status and renewal cap; the reservation check needs the store
	pub fn ensure_renewable(&self, policy: &LoanPolicy) -> Result<()> {
		self.ensure_active()?;
		if self.renewals >= policy.max_renewals {
			return Err(LibraryError::LimitReached {
				limit: policy.max_renewals,
			});
		}
		Ok(())
	}

	/// Extends the due date by one loan period
	pub fn renew(&mut self, policy: &LoanPolicy) -> Result<()> {
		self.ensure_renewable(policy)?;
		self.renewals += 1;
		self.due_date = policy.due_date_from(self.due_date);
		Ok(())
	}

	/// Closes an outstanding loan
	pub fn mark_returned(&mut self, at: DateTime<Utc>) -> Result<()> {
		if !self.is_outstanding() {
			return Err(LibraryError::InvalidState(format!(
				"loan {} was already returned",
				self.id
			)));
		}
		self.status = LoanStatus::Returned;
		self.returned_at = Some(at);
		Ok(())
	}

	/// Whole calendar days between the due date and `on`; zero when not late
	pub fn days_late(&self, on: NaiveDate) -> i64 {
		(on - self.due_date).num_days().max(0)
	}

	pub fn is_past_due(&self, on: NaiveDate) -> bool {
		on > self.due_date
	}
}
