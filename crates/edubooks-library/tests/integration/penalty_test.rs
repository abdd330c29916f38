//! Integration tests for the penalty engine

use crate::fixtures::{TestLibrary, desk, opening_time};
use chrono::TimeDelta;
use edubooks_core::{ErrorKind, NewPenalty, PenaltyKind, PenaltyStatus};
use edubooks_library::SweepOptions;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn test_ten_day_suspension_ends_exactly_ten_days_later(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;

	let suspension = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::suspension(ana.id, 10, "lost badge"))
		.await
		.unwrap();

	assert_eq!(suspension.kind, PenaltyKind::Suspension);
	assert_eq!(suspension.start_at, opening_time());
	assert_eq!(suspension.end_at, Some(opening_time() + TimeDelta::days(10)));
	assert_eq!(suspension.status, PenaltyStatus::Active);
}

#[rstest]
#[case(PenaltyKind::Fine, "amount")]
#[case(PenaltyKind::Suspension, "suspension_days")]
#[tokio::test]
async fn test_penalty_without_measure_is_missing_field(
	#[future] desk: TestLibrary,
	#[case] kind: PenaltyKind,
	#[case] field: &str,
) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let penalty = NewPenalty {
		user_id: Some(ana.id),
		loan_id: None,
		kind,
		amount: None,
		suspension_days: None,
		description: "incomplete".into(),
	};

	let err = desk.penalties().issue(&desk.admin, penalty).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::MissingField);
	assert!(err.to_string().contains(field));
}

#[rstest]
#[tokio::test]
async fn test_loan_only_penalty_targets_borrower(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Optics", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	let penalty = NewPenalty {
		user_id: None,
		loan_id: Some(loan.id),
		kind: PenaltyKind::Fine,
		amount: Some(8000),
		suspension_days: None,
		description: "water damage".into(),
	};

	let issued = desk.penalties().issue(&desk.admin, penalty).await.unwrap();

	assert_eq!(issued.user_id, ana.id);
	assert_eq!(issued.loan_id, Some(loan.id));
}

#[rstest]
#[tokio::test]
async fn test_students_cannot_issue_penalties(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;

	let err = desk
		.penalties()
		.issue(&ana, NewPenalty::fine(luis.id, 100, "spite"))
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test]
async fn test_pay_fine_marks_paid_once(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let fine = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::fine(ana.id, 15_000, "late"))
		.await
		.unwrap();

	desk.advance_days(1);
	let paid = desk.penalties().pay_fine(&ana, fine.id).await.unwrap();
	let again = desk.penalties().pay_fine(&ana, fine.id).await.unwrap_err();

	assert_eq!(paid.status, PenaltyStatus::Paid);
	assert_eq!(paid.end_at, Some(opening_time() + TimeDelta::days(1)));
	assert_eq!(again.kind(), ErrorKind::InvalidState);
}

#[rstest]
#[tokio::test]
async fn test_suspension_cannot_be_paid(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let suspension = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::suspension(ana.id, 3, "late"))
		.await
		.unwrap();

	let err = desk.penalties().pay_fine(&ana, suspension.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[rstest]
#[tokio::test]
async fn test_only_debtor_pays(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	let fine = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::fine(ana.id, 500, "late"))
		.await
		.unwrap();

	let err = desk.penalties().pay_fine(&luis, fine.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test]
async fn test_reject_completes_and_is_terminal(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let fine = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::fine(ana.id, 500, "disputed"))
		.await
		.unwrap();

	let approved = desk.penalties().approve(&desk.admin, fine.id).await.unwrap();
	let rejected = desk.penalties().reject(&desk.admin, fine.id).await.unwrap();
	let reopen = desk.penalties().approve(&desk.admin, fine.id).await.unwrap_err();

	assert_eq!(approved.status, PenaltyStatus::Active);
	assert_eq!(rejected.status, PenaltyStatus::Completed);
	assert_eq!(rejected.end_at, Some(opening_time()));
	assert_eq!(reopen.kind(), ErrorKind::InvalidState);
	assert!(desk.penalties().pending(&desk.admin).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_elapsed_suspensions_complete(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	desk.penalties()
		.issue(&desk.admin, NewPenalty::suspension(ana.id, 2, "short"))
		.await
		.unwrap();
	desk.penalties()
		.issue(&desk.admin, NewPenalty::suspension(luis.id, 9, "long"))
		.await
		.unwrap();

	desk.advance_days(2);
	let completed = desk.penalties().complete_elapsed_suspensions().await.unwrap();

	assert_eq!(completed, 1);
	let pending = desk.penalties().pending(&desk.admin).await.unwrap();
	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].user_id, luis.id);
	// Ana may borrow again
	let book = desk.book("Acoustics", 1).await;
	assert!(desk.loans().create(&ana, book.id, ana.id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_listing_is_scoped_to_debtor(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	desk.penalties()
		.issue(&desk.admin, NewPenalty::fine(ana.id, 100, "a"))
		.await
		.unwrap();
	desk.penalties()
		.issue(&desk.admin, NewPenalty::fine(luis.id, 200, "b"))
		.await
		.unwrap();

	let own = desk.penalties().list(&ana, None).await.unwrap();

	assert_eq!(own.len(), 1);
	assert_eq!(own[0].amount, Some(100));
	assert_eq!(
		desk.penalties().pending(&ana).await.unwrap_err().kind(),
		ErrorKind::Forbidden
	);
}

#[rstest]
#[tokio::test]
async fn test_dashboard_summarises_sanctions(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	let book = desk.book("Mechanics", 3).await;
	desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	desk.loans().create(&luis, book.id, luis.id).await.unwrap();
	desk.advance_days(20);
	desk.sweep().execute(SweepOptions::default()).await.unwrap();
	let extra = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::fine(ana.id, 1000, "late fee"))
		.await
		.unwrap();
	let paid = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::fine(luis.id, 700, "photocopies"))
		.await
		.unwrap();
	desk.penalties().pay_fine(&luis, paid.id).await.unwrap();

	// Act
	let dashboard = desk.penalties().dashboard(&desk.admin).await.unwrap();

	// Assert
	assert_eq!(dashboard.totals.total, 4);
	assert_eq!(dashboard.totals.active, 3);
	assert_eq!(dashboard.totals.paid, 1);
	assert_eq!(
		dashboard.totals.outstanding_amount,
		2 * 25_000 + extra.amount.unwrap()
	);
	assert_eq!(dashboard.overdue_without_penalty, 0);
	assert_eq!(dashboard.top_users[0].user_id, ana.id);
	assert_eq!(dashboard.top_users[0].penalty_count, 2);
	assert_eq!(dashboard.top_users[1].penalty_count, 1);
}

#[rstest]
#[case(3651)]
#[case(i32::MAX)]
#[tokio::test]
async fn test_overlong_suspension_is_rejected(#[future] desk: TestLibrary, #[case] days: i32) {
	let desk = desk.await;
	let ana = desk.student("ana").await;

	let err = desk
		.penalties()
		.issue(&desk.admin, NewPenalty::suspension(ana.id, days, "excessive"))
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Validation);
	assert!(desk.penalties().list(&desk.admin, None).await.unwrap().is_empty());
}
