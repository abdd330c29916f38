//! Integration tests for the batch overdue sweep

use crate::fixtures::{TestLibrary, desk};
use edubooks_core::{ErrorKind, LoanStatus, NewPenalty, PenaltyKind};
use edubooks_library::SweepOptions;
use rstest::rstest;

/// Ana borrows a book on March 1st (due March 16th) and the clock moves
/// forward `days` days
async fn late_loan(desk: &TestLibrary, days: i64) -> edubooks_core::Loan {
	let ana = desk.student("ana").await;
	let book = desk.book("Software Engineering", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	desk.advance_days(days);
	loan
}

#[rstest]
#[tokio::test]
async fn test_sweep_marks_overdue_and_fines(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let loan = late_loan(&desk, 20).await;

	// Act
	let report = desk.sweep().execute(SweepOptions::default()).await.unwrap();

	// Assert
	assert_eq!(report.found, 1);
	assert_eq!(report.processed.len(), 1);
	let entry = &report.processed[0];
	assert_eq!(entry.loan_id, loan.id);
	assert_eq!(entry.days_late, 5);
	assert_eq!(entry.amount, 25_000);
	assert!(entry.penalty_id.is_some());
	assert!(report.failures.is_empty());

	let swept = desk.loans().get(&desk.admin, loan.id).await.unwrap();
	assert_eq!(swept.status, LoanStatus::Overdue);
	let fines = desk.penalties().list(&desk.admin, None).await.unwrap();
	assert_eq!(fines.len(), 1);
	assert_eq!(fines[0].kind, PenaltyKind::Fine);
	assert_eq!(fines[0].loan_id, Some(loan.id));
}

#[rstest]
#[tokio::test]
async fn test_second_run_creates_no_new_penalty(#[future] desk: TestLibrary) {
	let desk = desk.await;
	late_loan(&desk, 30).await;

	let first = desk.sweep().execute(SweepOptions::default()).await.unwrap();
	let second = desk.sweep().execute(SweepOptions::default()).await.unwrap();

	assert_eq!(first.processed.len(), 1);
	assert_eq!(second.found, 0);
	assert!(second.processed.is_empty());
	assert_eq!(desk.penalties().list(&desk.admin, None).await.unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_loan_with_existing_penalty_is_skipped(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let loan = late_loan(&desk, 25).await;
	desk.penalties()
		.issue(
			&desk.admin,
			NewPenalty::fine(loan.user_id, 1000, "torn page").for_loan(loan.id),
		)
		.await
		.unwrap();

	let report = desk.sweep().execute(SweepOptions::default()).await.unwrap();

	assert_eq!(report.found, 1);
	assert!(report.processed.is_empty());
	assert_eq!(report.skipped.len(), 1);
	assert_eq!(report.skipped[0].loan_id, loan.id);
	let untouched = desk.loans().get(&desk.admin, loan.id).await.unwrap();
	assert_eq!(untouched.status, LoanStatus::Active);
}

#[rstest]
#[tokio::test]
async fn test_dry_run_persists_nothing(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let loan = late_loan(&desk, 18).await;

	let report = desk
		.sweep()
		.execute(SweepOptions::default().dry_run())
		.await
		.unwrap();

	assert!(report.dry_run);
	assert_eq!(report.processed.len(), 1);
	assert_eq!(report.processed[0].penalty_id, None);
	assert_eq!(report.total_amount(), 3 * 5000);
	let untouched = desk.loans().get(&desk.admin, loan.id).await.unwrap();
	assert_eq!(untouched.status, LoanStatus::Active);
	assert!(desk.penalties().list(&desk.admin, None).await.unwrap().is_empty());
}

#[rstest]
#[case(0, 1)]
#[case(4, 1)]
#[case(5, 0)]
#[case(10, 0)]
#[tokio::test]
async fn test_grace_days_shift_the_cutoff(
	#[future] desk: TestLibrary,
	#[case] grace_days: u32,
	#[case] expected: usize,
) {
	// Five days late on March 21st
	let desk = desk.await;
	late_loan(&desk, 20).await;

	let report = desk
		.sweep()
		.execute(SweepOptions::default().with_grace_days(grace_days).dry_run())
		.await
		.unwrap();

	assert_eq!(report.found, expected);
}

#[rstest]
#[tokio::test]
async fn test_daily_rate_override(#[future] desk: TestLibrary) {
	let desk = desk.await;
	late_loan(&desk, 19).await;

	let report = desk
		.sweep()
		.execute(SweepOptions::default().with_daily_rate(1200))
		.await
		.unwrap();

	assert_eq!(report.daily_rate, 1200);
	assert_eq!(report.processed[0].amount, 4 * 1200);
}

#[rstest]
#[tokio::test]
async fn test_report_lists_loans_due_soon(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let loan = late_loan(&desk, 13).await;

	let report = desk.sweep().execute(SweepOptions::default()).await.unwrap();

	assert_eq!(report.found, 0);
	assert_eq!(report.upcoming.len(), 1);
	assert_eq!(report.upcoming[0].id, loan.id);
}

/// A swept loan can still be checked in, without a second fine
#[rstest]
#[tokio::test]
async fn test_return_after_sweep_is_not_fined_twice(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let loan = late_loan(&desk, 20).await;
	desk.sweep().execute(SweepOptions::default()).await.unwrap();

	desk.advance_days(2);
	let returned = desk.loans().return_loan(&desk.admin, loan.id).await.unwrap();

	assert_eq!(returned.loan.status, LoanStatus::Returned);
	assert_eq!(returned.fine, None);
	assert_eq!(desk.available(loan.book_id).await, 1);
	assert_eq!(desk.penalties().list(&desk.admin, None).await.unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_run_requires_administrator(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let loan = late_loan(&desk, 20).await;
	let ana = desk.users().get(&desk.admin, loan.user_id).await.unwrap();

	let err = desk.sweep().run(&ana, SweepOptions::default()).await.unwrap_err();
	let report = desk.sweep().run(&desk.admin, SweepOptions::default()).await.unwrap();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert_eq!(report.processed.len(), 1);
}

#[rstest]
#[case(SweepOptions::default().with_grace_days(u32::MAX))]
#[case(SweepOptions::default().with_upcoming_window(u32::MAX))]
#[tokio::test]
async fn test_out_of_range_windows_are_rejected(
	#[future] desk: TestLibrary,
	#[case] options: SweepOptions,
) {
	let desk = desk.await;
	let loan = late_loan(&desk, 20).await;

	let err = desk.sweep().execute(options).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Validation);
	let untouched = desk.loans().get(&desk.admin, loan.id).await.unwrap();
	assert_eq!(untouched.status, LoanStatus::Active);
}

/// A record that fails is rolled back on its own; the rest of the batch commits
#[rstest]
#[tokio::test]
async fn test_failed_loan_is_skipped_and_batch_commits(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let ben = desk.student("ben").await;
	let first = desk.book("Discrete Mathematics", 1).await;
	let second = desk.book("Linear Algebra", 1).await;
	let broken = desk.loans().create(&ana, first.id, ana.id).await.unwrap();
	let healthy = desk.loans().create(&ben, second.id, ben.id).await.unwrap();
	sqlx::query(&format!(
		"CREATE TRIGGER reject_fine BEFORE INSERT ON penalties \
		 WHEN NEW.loan_id = {} BEGIN SELECT RAISE(ABORT, 'fine rejected'); END",
		broken.id
	))
	.execute(desk.database().pool())
	.await
	.unwrap();
	desk.advance_days(20);

	// Act
	let report = desk.sweep().execute(SweepOptions::default()).await.unwrap();

	// Assert
	assert_eq!(report.found, 2);
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].loan_id, broken.id);
	assert_eq!(report.processed.len(), 1);
	assert_eq!(report.processed[0].loan_id, healthy.id);

	let broken = desk.loans().get(&desk.admin, broken.id).await.unwrap();
	assert_eq!(broken.status, LoanStatus::Active);
	let healthy = desk.loans().get(&desk.admin, healthy.id).await.unwrap();
	assert_eq!(healthy.status, LoanStatus::Overdue);
	let fines = desk.penalties().list(&desk.admin, None).await.unwrap();
	assert_eq!(fines.len(), 1);
	assert_eq!(fines[0].loan_id, Some(healthy.id));
}
