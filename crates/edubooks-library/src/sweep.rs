//! Batch overdue sweep
//!
//! Flags active loans past their due date as overdue and fines each one
//! exactly once. A run is a single transaction; every loan is processed in
//! its own savepoint so that one bad record is logged and skipped without
//! losing the rest of the batch. In dry-run mode the fines are computed but
//! the transaction is rolled back.

use crate::library::Library;
use chrono::{DateTime, NaiveDate, Utc};
use edubooks_auth::{Action, authorize};
use edubooks_core::{
	BookId, LibraryError, Loan, LoanId, LoanStatus, PenaltyId, PenaltyKind, Result, User, UserId,
	policy,
};
use edubooks_db::SqliteConnection;
use edubooks_db::queries::penalties::PenaltyRow;
use edubooks_db::queries::{books, loans, penalties};
use serde::Serialize;
use sqlx::Connection;
use tracing::{error, info, warn};

/// Days ahead listed as upcoming due dates
pub const DEFAULT_UPCOMING_WINDOW_DAYS: u32 = 3;

/// Knobs for one sweep run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
	/// Compute without persisting
	pub dry_run: bool,
	/// Extra days tolerated past the due date
	pub grace_days: u32,
	/// Overrides the policy's daily fine
	pub daily_rate: Option<i64>,
	pub upcoming_window_days: u32,
}

impl Default for SweepOptions {
	fn default() -> Self {
		Self {
			dry_run: false,
			grace_days: 0,
			daily_rate: None,
			upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
		}
	}
}

impl SweepOptions {
	pub fn dry_run(mut self) -> Self {
		self.dry_run = true;
		self
	}

	pub fn with_grace_days(mut self, days: u32) -> Self {
		self.grace_days = days;
		self
	}

	pub fn with_daily_rate(mut self, rate: i64) -> Self {
		self.daily_rate = Some(rate);
		self
	}

	pub fn with_upcoming_window(mut self, days: u32) -> Self {
		self.upcoming_window_days = days;
		self
	}
}

/// A loan flagged overdue by the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedLoan {
	pub loan_id: LoanId,
	pub book_id: BookId,
	pub user_id: UserId,
	pub due_date: NaiveDate,
	pub days_late: i64,
	pub amount: i64,
	/// `None` in dry-run mode
	pub penalty_id: Option<PenaltyId>,
}

/// A loan left alone because a penalty already references it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLoan {
	pub loan_id: LoanId,
	pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
	pub loan_id: LoanId,
	pub error: String,
}

/// Summary of a sweep run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
	pub run_on: NaiveDate,
	/// Loans due strictly before this date were candidates
	pub cutoff: NaiveDate,
	pub dry_run: bool,
	pub daily_rate: i64,
	pub found: usize,
	pub processed: Vec<ProcessedLoan>,
	pub skipped: Vec<SkippedLoan>,
	pub failures: Vec<SweepFailure>,
	/// Active loans due within the upcoming window
	pub upcoming: Vec<Loan>,
}

impl SweepReport {
	fn new(run_on: NaiveDate, cutoff: NaiveDate, options: &SweepOptions, daily_rate: i64) -> Self {
		Self {
			run_on,
			cutoff,
			dry_run: options.dry_run,
			daily_rate,
			found: 0,
			processed: Vec::new(),
			skipped: Vec::new(),
			failures: Vec::new(),
			upcoming: Vec::new(),
		}
	}

	/// Sum of the fines issued, or that would be issued in dry-run mode
	pub fn total_amount(&self) -> i64 {
		self.processed.iter().map(|entry| entry.amount).sum()
	}

	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}
}

enum Outcome {
	Processed(ProcessedLoan),
	Skipped,
}

#[derive(Debug, Clone, Copy)]
pub struct Sweep<'a> {
	library: &'a Library,
}

impl<'a> Sweep<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	/// Runs the sweep on behalf of an administrator
	pub async fn run(&self, actor: &User, options: SweepOptions) -> Result<SweepReport> {
		authorize(actor, Action::RunSweep)?;
		self.execute(options).await
	}

	/// Runs the sweep without an acting user, as the scheduler and the CLI do
	pub async fn execute(&self, options: SweepOptions) -> Result<SweepReport> {
		let now = self.library.clock().now();
		let today = self.library.clock().today();
		let daily_rate = options
			.daily_rate
			.unwrap_or(self.library.policy().daily_fine);
		let cutoff = policy::days_before(today, options.grace_days)?;
		let until = policy::days_after(today, options.upcoming_window_days)?;
		let mut report = SweepReport::new(today, cutoff, &options, daily_rate);

		let mut tx = self.library.database().begin().await?;
		let candidates = loans::active_due_before(&mut tx, cutoff).await?;
		report.found = candidates.len();
		info!(
			found = report.found,
			%cutoff,
			dry_run = options.dry_run,
			"Processing overdue loans"
		);

		for loan in candidates {
			let mut savepoint = tx.begin().await?;
			let outcome =
				process_loan(&mut savepoint, &loan, today, now, daily_rate, options.dry_run).await;
			match outcome {
				Ok(Outcome::Processed(entry)) => {
					savepoint.commit().await?;
					info!(
						loan_id = %entry.loan_id,
						user_id = %entry.user_id,
						days_late = entry.days_late,
						amount = entry.amount,
						"Loan marked overdue"
					);
					report.processed.push(entry);
				}
				Ok(Outcome::Skipped) => {
					savepoint.commit().await?;
					info!(loan_id = %loan.id, "Penalty already exists for loan, skipping");
					report.skipped.push(SkippedLoan {
						loan_id: loan.id,
						user_id: loan.user_id,
					});
				}
				Err(err) => {
					savepoint.rollback().await?;
					error!(loan_id = %loan.id, error = %err, "Failed to process overdue loan");
					report.failures.push(SweepFailure {
						loan_id: loan.id,
						error: err.to_string(),
					});
				}
			}
		}

		report.upcoming = loans::active_due_between(&mut tx, today, until).await?;

		if options.dry_run {
			tx.rollback().await?;
		} else {
			tx.commit().await?;
		}

		if report.has_failures() {
			warn!(failures = report.failures.len(), "Sweep finished with failures");
		}
		info!(
			processed = report.processed.len(),
			skipped = report.skipped.len(),
			failures = report.failures.len(),
			total_amount = report.total_amount(),
			upcoming = report.upcoming.len(),
			dry_run = options.dry_run,
			"Overdue sweep completed"
		);
		Ok(report)
	}
}

async fn process_loan(
	conn: &mut SqliteConnection,
	loan: &Loan,
	today: NaiveDate,
	now: DateTime<Utc>,
	daily_rate: i64,
	dry_run: bool,
) -> Result<Outcome> {
	if penalties::exists_for_loan(conn, loan.id).await? {
		return Ok(Outcome::Skipped);
	}

	let days_late = loan.days_late(today);
	let amount = policy::fine_for(days_late, daily_rate);
	let mut entry = ProcessedLoan {
		loan_id: loan.id,
		book_id: loan.book_id,
		user_id: loan.user_id,
		due_date: loan.due_date,
		days_late,
		amount,
		penalty_id: None,
	};
	if dry_run {
		return Ok(Outcome::Processed(entry));
	}

	if !loans::transition_from_active(conn, loan.id, LoanStatus::Overdue).await? {
		return Err(LibraryError::InvalidState(format!(
			"loan {} is no longer active",
			loan.id
		)));
	}
	let book = books::fetch(conn, loan.book_id).await?;
	let description = format!(
		"Overdue loan of \"{}\": {days_late} day(s) late at {daily_rate} per day",
		book.title
	);
	let penalty = penalties::insert(
		conn,
		&PenaltyRow {
			user_id: loan.user_id,
			loan_id: Some(loan.id),
			kind: PenaltyKind::Fine,
			amount: Some(amount),
			suspension_days: None,
			description: &description,
			start_at: now,
			end_at: None,
		},
	)
	.await?;
	entry.penalty_id = Some(penalty.id);
	Ok(Outcome::Processed(entry))
}
