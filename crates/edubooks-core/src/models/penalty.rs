//! Penalty model
//!
//! A penalty is either a `Fine` (carries an amount) or a `Suspension`
//! (carries a duration in days). Status moves `Active -> Paid` (fines only)
//! or `Active -> Completed`; both targets are terminal.

use crate::error::{LibraryError, Result};
use crate::ids::{LoanId, PenaltyId, UserId};
use crate::policy::{self, MAX_PERIOD_DAYS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PenaltyKind {
	Fine,
	Suspension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PenaltyStatus {
	Active,
	Paid,
	Completed,
}

/// Persisted penalty record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Penalty {
	pub id: PenaltyId,
	pub user_id: UserId,
	pub loan_id: Option<LoanId>,
	pub kind: PenaltyKind,
	/// Fine amount in whole currency units
	pub amount: Option<i64>,
	pub suspension_days: Option<i32>,
	pub description: String,
	pub start_at: DateTime<Utc>,
	pub end_at: Option<DateTime<Utc>>,
	pub status: PenaltyStatus,
}

impl Penalty {
	pub fn is_active(&self) -> bool {
		self.status == PenaltyStatus::Active
	}

	fn ensure_active(&self) -> Result<()> {
		if self.is_active() {
			Ok(())
		} else {
			Err(LibraryError::InvalidState(format!(
				"penalty {} is not active",
				self.id
			)))
		}
	}

	/// Settles a fine
	pub fn pay(&mut self, at: DateTime<Utc>) -> Result<()> {
		if self.kind != PenaltyKind::Fine {
			return Err(LibraryError::InvalidState(format!(
				"penalty {} is not a fine",
				self.id
			)));
		}
		self.ensure_active()?;
		self.status = PenaltyStatus::Paid;
		self.end_at = Some(at);
		Ok(())
	}

	/// Confirms an active penalty; the record is left as it is
	pub fn approve(&self) -> Result<()> {
		self.ensure_active()
	}

	/// Closes an active penalty without payment
	pub fn reject(&mut self, at: DateTime<Utc>) -> Result<()> {
		self.ensure_active()?;
		self.status = PenaltyStatus::Completed;
		self.end_at = Some(at);
		Ok(())
	}

	/// Active suspension whose end has passed at `now`
	pub fn suspension_elapsed(&self, now: DateTime<Utc>) -> bool {
		self.is_active()
			&& self.kind == PenaltyKind::Suspension
			&& self.end_at.is_some_and(|end| end <= now)
	}
}

/// Payload for issuing a penalty
///
/// Either `user_id` or `loan_id` must be given; with only a loan the
/// borrower of that loan is penalised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPenalty {
	#[serde(default)]
	pub user_id: Option<UserId>,
	#[serde(default)]
	pub loan_id: Option<LoanId>,
	pub kind: PenaltyKind,
	#[serde(default)]
	pub amount: Option<i64>,
	#[serde(default)]
	pub suspension_days: Option<i32>,
	#[serde(default)]
	pub description: String,
}

impl NewPenalty {
	pub fn fine(user_id: UserId, amount: i64, description: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id),
			loan_id: None,
			kind: PenaltyKind::Fine,
			amount: Some(amount),
			suspension_days: None,
			description: description.into(),
		}
	}

	pub fn suspension(user_id: UserId, days: i32, description: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id),
			loan_id: None,
			kind: PenaltyKind::Suspension,
			amount: None,
			suspension_days: Some(days),
			description: description.into(),
		}
	}

	pub fn for_loan(mut self, loan_id: LoanId) -> Self {
		self.loan_id = Some(loan_id);
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.user_id.is_none() && self.loan_id.is_none() {
			return Err(LibraryError::MissingField("user_id"));
		}
		match self.kind {
			PenaltyKind::Fine => match self.amount {
				None => Err(LibraryError::MissingField("amount")),
				Some(amount) if amount <= 0 => Err(LibraryError::Validation(
					"fine amount must be positive".into(),
				)),
				Some(_) => Ok(()),
			},
			PenaltyKind::Suspension => match self.suspension_days {
				None => Err(LibraryError::MissingField("suspension_days")),
				Some(days) if days <= 0 => Err(LibraryError::Validation(
					"suspension must last at least one day".into(),
				)),
				Some(days) if days.unsigned_abs() > MAX_PERIOD_DAYS => Err(LibraryError::Validation(
					format!("suspension cannot exceed {MAX_PERIOD_DAYS} days"),
				)),
				Some(_) => Ok(()),
			},
		}
	}

	/// End timestamp of a penalty starting at `start`; fines have none
	pub fn end_from(&self, start: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
		match (self.kind, self.suspension_days) {
			(PenaltyKind::Suspension, Some(days)) => {
				let days = u32::try_from(days).map_err(|_| {
					LibraryError::Validation("suspension must last at least one day".into())
				})?;
				policy::instant_after(start, days).map(Some)
			}
			_ => Ok(None),
		}
	}
}
