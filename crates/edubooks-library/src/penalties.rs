//! Penalty engine

use crate::library::Library;
use edubooks_auth::{Action, authorize};
use edubooks_core::{LibraryError, NewPenalty, Penalty, PenaltyId, PenaltyStatus, Result, User};
use edubooks_db::queries::penalties::{PenaltyRow, PenaltyTotals, UserPenaltyCount};
use edubooks_db::queries::{loans, penalties, users};
use serde::Serialize;
use tracing::info;

/// Users listed on the sanction dashboard
const TOP_SANCTIONED_USERS: i64 = 5;

/// Administrative overview of sanctions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PenaltyDashboard {
	pub totals: PenaltyTotals,
	/// Loans past their due date that nobody has fined yet
	pub overdue_without_penalty: i64,
	pub top_users: Vec<UserPenaltyCount>,
}

#[derive(Debug, Clone, Copy)]
pub struct Penalties<'a> {
	library: &'a Library,
}

impl<'a> Penalties<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	/// Issues a fine or a suspension
	///
	/// When only `loan_id` is given the loan's borrower is penalised. A
	/// suspension ends `suspension_days` after it starts.
	pub async fn issue(&self, actor: &User, penalty: NewPenalty) -> Result<Penalty> {
		authorize(actor, Action::IssuePenalty)?;
		penalty.validate()?;
		let now = self.library.clock().now();

		let mut tx = self.library.database().begin().await?;
		let borrower = match penalty.loan_id {
			Some(loan_id) => Some(loans::fetch(&mut tx, loan_id).await?.user_id),
			None => None,
		};
		let user_id = match (penalty.user_id, borrower) {
			(Some(user_id), Some(borrower)) if user_id != borrower => {
				return Err(LibraryError::Validation(format!(
					"loan {} does not belong to user {user_id}",
					penalty.loan_id.map_or(0, i64::from)
				)));
			}
			(Some(user_id), _) => user_id,
			(None, Some(borrower)) => borrower,
			(None, None) => return Err(LibraryError::MissingField("user_id")),
		};
		let user = users::fetch(&mut tx, user_id).await?;

		let row = PenaltyRow {
			user_id: user.id,
			loan_id: penalty.loan_id,
			kind: penalty.kind,
			amount: penalty.amount,
			suspension_days: penalty.suspension_days,
			description: &penalty.description,
			start_at: now,
			end_at: penalty.end_from(now)?,
		};
		let issued = penalties::insert(&mut tx, &row).await?;
		tx.commit().await?;

		info!(
			penalty_id = %issued.id,
			user_id = %user.id,
			kind = ?issued.kind,
			"Penalty issued"
		);
		Ok(issued)
	}

	/// Settles an active fine owned by the actor
	pub async fn pay_fine(&self, actor: &User, id: PenaltyId) -> Result<Penalty> {
		let now = self.library.clock().now();

		let mut tx = self.library.database().begin().await?;
		let mut penalty = penalties::fetch(&mut tx, id).await?;
		authorize(
			actor,
			Action::PayFine {
				debtor: penalty.user_id,
			},
		)?;
		penalty.pay(now)?;
		let paid = penalties::save(&mut tx, &penalty).await?;
		tx.commit().await?;

		info!(penalty_id = %id, amount = ?paid.amount, "Fine paid");
		Ok(paid)
	}

	/// Confirms an active penalty; nothing changes on the record
	pub async fn approve(&self, actor: &User, id: PenaltyId) -> Result<Penalty> {
		authorize(actor, Action::ReviewPenalty)?;
		let mut conn = self.library.database().acquire().await?;
		let penalty = penalties::fetch(&mut conn, id).await?;
		penalty.approve()?;

		info!(penalty_id = %id, "Penalty approved");
		Ok(penalty)
	}

	/// Completes an active penalty without payment
	pub async fn reject(&self, actor: &User, id: PenaltyId) -> Result<Penalty> {
		authorize(actor, Action::ReviewPenalty)?;
		let now = self.library.clock().now();

		let mut tx = self.library.database().begin().await?;
		let mut penalty = penalties::fetch(&mut tx, id).await?;
		penalty.reject(now)?;
		let rejected = penalties::save(&mut tx, &penalty).await?;
		tx.commit().await?;

		info!(penalty_id = %id, "Penalty rejected");
		Ok(rejected)
	}

	pub async fn get(&self, actor: &User, id: PenaltyId) -> Result<Penalty> {
		let mut conn = self.library.database().acquire().await?;
		let penalty = penalties::fetch(&mut conn, id).await?;
		authorize(
			actor,
			Action::ViewRecord {
				owner: penalty.user_id,
			},
		)?;
		Ok(penalty)
	}

	/// Every penalty for administrators, the actor's own otherwise
	pub async fn list(&self, actor: &User, status: Option<PenaltyStatus>) -> Result<Vec<Penalty>> {
		authorize(actor, Action::ViewRecord { owner: actor.id })?;
		let scope = (!actor.is_admin()).then_some(actor.id);

		let mut conn = self.library.database().acquire().await?;
		penalties::list(&mut conn, scope, status).await
	}

	/// Active penalties awaiting review
	pub async fn pending(&self, actor: &User) -> Result<Vec<Penalty>> {
		authorize(actor, Action::ReviewPenalty)?;
		let mut conn = self.library.database().acquire().await?;
		penalties::list(&mut conn, None, Some(PenaltyStatus::Active)).await
	}

	/// Completes active suspensions whose end has passed
	pub async fn complete_elapsed_suspensions(&self) -> Result<u64> {
		let now = self.library.clock().now();
		let mut conn = self.library.database().acquire().await?;
		let completed = penalties::complete_elapsed_suspensions(&mut conn, now).await?;
		if completed > 0 {
			info!(completed, "Completed elapsed suspensions");
		}
		Ok(completed)
	}

	pub async fn dashboard(&self, actor: &User) -> Result<PenaltyDashboard> {
		authorize(actor, Action::ViewStatistics)?;
		let today = self.library.clock().today();

		let mut conn = self.library.database().acquire().await?;
		let totals = penalties::totals(&mut conn).await?;
		let overdue_without_penalty = loans::count_overdue_without_penalty(&mut conn, today).await?;
		let top_users = penalties::top_users(&mut conn, TOP_SANCTIONED_USERS).await?;
		Ok(PenaltyDashboard {
			totals,
			overdue_without_penalty,
			top_users,
		})
	}
}
