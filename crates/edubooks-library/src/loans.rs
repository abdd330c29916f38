//! Loan ledger
//!
//! Creating or returning a loan moves the book's availability counter. The
//! counter update, the status reconciliation and the loan write share one
//! transaction, so a failure leaves neither half applied.

use crate::library::Library;
use edubooks_auth::{Action, authorize};
use edubooks_core::{
	BookId, LibraryError, Loan, LoanId, LoanStatus, Penalty, PenaltyKind, Result, User, UserId,
	policy,
};
use edubooks_db::queries::penalties::PenaltyRow;
use edubooks_db::queries::{books, loans, penalties, reservations, users};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of returning a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanReturn {
	pub loan: Loan,
	/// Fine issued for a late return
	pub fine: Option<Penalty>,
}

#[derive(Debug, Clone, Copy)]
pub struct Loans<'a> {
	library: &'a Library,
}

impl<'a> Loans<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	/// Lends one copy of `book_id` to `borrower_id`
	///
	/// # Errors
	///
	/// - `Unavailable` when no copy is left
	/// - `Sanctioned` when the borrower has an active penalty
	/// - `Forbidden` when the actor may not borrow for `borrower_id` or the
	///   borrower account is inactive
	pub async fn create(&self, actor: &User, book_id: BookId, borrower_id: UserId) -> Result<Loan> {
		self.create_with_notes(actor, book_id, borrower_id, None).await
	}

	pub async fn create_with_notes(
		&self,
		actor: &User,
		book_id: BookId,
		borrower_id: UserId,
		notes: Option<&str>,
	) -> Result<Loan> {
		authorize(
			actor,
			Action::CreateLoan {
				borrower: borrower_id,
			},
		)?;
		let clock = self.library.clock();
		let now = clock.now();

		let mut tx = self.library.database().begin().await?;
		let book = books::fetch(&mut tx, book_id).await?;
		let borrower = users::fetch(&mut tx, borrower_id).await?;
		if !borrower.is_active {
			return Err(LibraryError::Forbidden(format!(
				"user {} is inactive",
				borrower.id
			)));
		}
		if !book.is_available() {
			return Err(unavailable(&book.title));
		}
		if penalties::has_active(&mut tx, borrower.id).await? {
			return Err(LibraryError::Sanctioned {
				user_id: borrower.id,
			});
		}

		if !books::decrement_available(&mut tx, book.id).await? {
			return Err(unavailable(&book.title));
		}
		books::sync_status(&mut tx, book.id).await?;

		let due_date = self.library.policy().due_date_from(clock.today());
		let loan = loans::insert(&mut tx, book.id, borrower.id, now, due_date, notes).await?;
		let fulfilled = reservations::complete_active(&mut tx, book.id, borrower.id).await?;
		tx.commit().await?;

		if fulfilled > 0 {
			debug!(book_id = %book.id, user_id = %borrower.id, "Reservation fulfilled by loan");
		}
		info!(
			loan_id = %loan.id,
			book_id = %book.id,
			user_id = %borrower.id,
			%due_date,
			"Loan created"
		);
		Ok(loan)
	}

	/// Checks a copy back in
	///
	/// A late return issues a fine of days late times the daily rate, unless
	/// the overdue sweep already fined this loan.
	pub async fn return_loan(&self, actor: &User, id: LoanId) -> Result<LoanReturn> {
		authorize(actor, Action::ReturnLoan)?;
		let clock = self.library.clock();
		let policy = self.library.policy();
		let now = clock.now();

		let mut tx = self.library.database().begin().await?;
		let mut loan = loans::fetch(&mut tx, id).await?;
		loan.mark_returned(now)?;
		let loan = loans::save(&mut tx, &loan).await?;

		if !books::increment_available(&mut tx, loan.book_id).await? {
			return Err(LibraryError::InvalidState(format!(
				"book {} has no copies out",
				loan.book_id
			)));
		}
		let book = books::sync_status(&mut tx, loan.book_id).await?;

		let days_late = loan.days_late(clock.today());
		let fine = if days_late > 0 && !penalties::exists_for_loan(&mut tx, loan.id).await? {
			let description = format!(
				"Late return of \"{}\": {days_late} day(s) at {} per day",
				book.title, policy.daily_fine
			);
			let row = PenaltyRow {
				user_id: loan.user_id,
				loan_id: Some(loan.id),
				kind: PenaltyKind::Fine,
				amount: Some(policy.fine_for(days_late)),
				suspension_days: None,
				description: &description,
				start_at: now,
				end_at: None,
			};
			Some(penalties::insert(&mut tx, &row).await?)
		} else {
			None
		};
		tx.commit().await?;

		info!(
			loan_id = %loan.id,
			book_id = %loan.book_id,
			days_late,
			fined = fine.is_some(),
			"Loan returned"
		);
		Ok(LoanReturn { loan, fine })
	}

	/// Extends an active loan by one loan period
	///
	/// # Errors
	///
	/// - `InvalidState` when the loan is not active
	/// - `LimitReached` after the maximum number of renewals
	/// - `Conflict` when another user holds a live reservation on the book
	pub async fn renew(&self, actor: &User, id: LoanId) -> Result<Loan> {
		let policy = self.library.policy();
		let now = self.library.clock().now();

		let mut tx = self.library.database().begin().await?;
		let mut loan = loans::fetch(&mut tx, id).await?;
		authorize(
			actor,
			Action::RenewLoan {
				borrower: loan.user_id,
			},
		)?;
		loan.ensure_renewable(policy)?;
		if let Some(hold) =
			reservations::live_held_by_other(&mut tx, loan.book_id, loan.user_id, now).await?
		{
			return Err(LibraryError::Conflict(format!(
				"book {} is reserved by another user until {}",
				loan.book_id, hold.expires_at
			)));
		}

		loan.renew(policy)?;
		let loan = loans::save(&mut tx, &loan).await?;
		tx.commit().await?;

		info!(
			loan_id = %loan.id,
			renewals = loan.renewals,
			due_date = %loan.due_date,
			"Loan renewed"
		);
		Ok(loan)
	}

	pub async fn get(&self, actor: &User, id: LoanId) -> Result<Loan> {
		let mut conn = self.library.database().acquire().await?;
		let loan = loans::fetch(&mut conn, id).await?;
		authorize(
			actor,
			Action::ViewRecord {
				owner: loan.user_id,
			},
		)?;
		Ok(loan)
	}

	/// Every loan for administrators, the actor's own loans otherwise
	pub async fn list(&self, actor: &User, status: Option<LoanStatus>) -> Result<Vec<Loan>> {
		authorize(actor, Action::ViewRecord { owner: actor.id })?;
		let scope = (!actor.is_admin()).then_some(actor.id);

		let mut conn = self.library.database().acquire().await?;
		loans::list(&mut conn, scope, status).await
	}

	/// Active loans whose due date has passed
	pub async fn overdue(&self, actor: &User) -> Result<Vec<Loan>> {
		authorize(actor, Action::ViewStatistics)?;
		let today = self.library.clock().today();

		let mut conn = self.library.database().acquire().await?;
		loans::active_due_before(&mut conn, today).await
	}

	/// Active loans due between today and `window_days` from now, inclusive
	pub async fn upcoming_due(&self, window_days: u32) -> Result<Vec<Loan>> {
		let today = self.library.clock().today();
		let until = policy::days_after(today, window_days)?;

		let mut conn = self.library.database().acquire().await?;
		loans::active_due_between(&mut conn, today, until).await
	}
}

fn unavailable(title: &str) -> LibraryError {
	LibraryError::Unavailable(format!("no copies of \"{title}\" are available"))
}
