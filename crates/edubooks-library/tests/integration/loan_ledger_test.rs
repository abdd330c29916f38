//! Integration tests for the loan ledger

use crate::fixtures::{TestLibrary, desk};
use chrono::NaiveDate;
use edubooks_core::{
	BookStatus, ErrorKind, LoanStatus, NewBook, NewPenalty, PenaltyKind, ReservationStatus,
};
use rstest::rstest;

fn date(month: u32, day: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

/// Borrowing takes one copy and sets the due date one loan period out
#[rstest]
#[tokio::test]
async fn test_create_loan_takes_a_copy(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Operating Systems", 2).await;

	// Act
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	// Assert
	assert_eq!(loan.status, LoanStatus::Active);
	assert_eq!(loan.due_date, date(3, 16));
	assert_eq!(loan.renewals, 0);
	assert_eq!(desk.available(book.id).await, 1);
}

#[rstest]
#[tokio::test]
async fn test_last_copy_flips_status_to_loaned(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	let book = desk.book("Compilers", 1).await;

	desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	let err = desk.loans().create(&luis, book.id, luis.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Unavailable);
	let detail = desk.catalog().get(book.id).await.unwrap();
	assert_eq!(detail.book.available_copies, 0);
	assert_eq!(detail.book.status, BookStatus::Loaned);
	assert_eq!(detail.outstanding_loans, 1);
}

#[rstest]
#[tokio::test]
async fn test_unavailable_is_reported_before_sanction(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk
		.catalog()
		.create(
			&desk.admin,
			NewBook::new("Networks", "Tanenbaum", "Textbook", "B-1", 1).with_available(0),
		)
		.await
		.unwrap();
	desk.penalties()
		.issue(&desk.admin, NewPenalty::fine(ana.id, 5000, "damaged cover"))
		.await
		.unwrap();

	let err = desk.loans().create(&ana, book.id, ana.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Unavailable);
}

#[rstest]
#[tokio::test]
async fn test_sanctioned_user_cannot_borrow(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Databases", 3).await;
	desk.penalties()
		.issue(&desk.admin, NewPenalty::suspension(ana.id, 7, "noise in the reading room"))
		.await
		.unwrap();

	let err = desk.loans().create(&ana, book.id, ana.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Sanctioned);
	assert_eq!(desk.available(book.id).await, 3);
}

#[rstest]
#[tokio::test]
async fn test_student_cannot_borrow_for_someone_else(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	let book = desk.book("Algorithms", 1).await;

	let err = desk.loans().create(&ana, book.id, luis.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert_eq!(desk.available(book.id).await, 1);
}

#[rstest]
#[tokio::test]
async fn test_missing_book_is_not_found(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;

	let err = desk
		.loans()
		.create(&ana, edubooks_core::BookId(999), ana.id)
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::NotFound);
}

/// Two copies, one borrowed and returned 20 days after its due date
#[rstest]
#[tokio::test]
async fn test_late_return_restores_copy_and_fines(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Discrete Mathematics", 2).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	assert_eq!(desk.available(book.id).await, 1);

	// Act
	desk.advance_days(15 + 20);
	let returned = desk.loans().return_loan(&desk.admin, loan.id).await.unwrap();

	// Assert
	assert_eq!(returned.loan.status, LoanStatus::Returned);
	assert!(returned.loan.returned_at.is_some());
	assert_eq!(desk.available(book.id).await, 2);
	let fine = returned.fine.expect("late return should be fined");
	assert_eq!(fine.kind, PenaltyKind::Fine);
	assert_eq!(fine.amount, Some(20 * 5000));
	assert_eq!(fine.user_id, ana.id);
	assert_eq!(fine.loan_id, Some(loan.id));
}

#[rstest]
#[tokio::test]
async fn test_on_time_return_has_no_fine(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Calculus", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	desk.advance_days(15);
	let returned = desk.loans().return_loan(&desk.admin, loan.id).await.unwrap();

	assert_eq!(returned.fine, None);
	let detail = desk.catalog().get(book.id).await.unwrap();
	assert_eq!(detail.book.status, BookStatus::Available);
}

#[rstest]
#[tokio::test]
async fn test_second_return_is_invalid_state(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Physics", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	desk.loans().return_loan(&desk.admin, loan.id).await.unwrap();

	let err = desk.loans().return_loan(&desk.admin, loan.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::InvalidState);
	assert_eq!(desk.available(book.id).await, 1);
}

#[rstest]
#[tokio::test]
async fn test_only_administrators_return_loans(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Chemistry", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	let err = desk.loans().return_loan(&ana, loan.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert_eq!(desk.available(book.id).await, 0);
}

#[rstest]
#[tokio::test]
async fn test_third_renewal_hits_limit(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Linear Algebra", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	let first = desk.loans().renew(&ana, loan.id).await.unwrap();
	let second = desk.loans().renew(&ana, loan.id).await.unwrap();
	let err = desk.loans().renew(&ana, loan.id).await.unwrap_err();

	assert_eq!(first.due_date, date(3, 31));
	assert_eq!(second.due_date, date(4, 15));
	assert_eq!(second.renewals, 2);
	assert_eq!(err.kind(), ErrorKind::LimitReached);
}

/// A live hold by another user blocks renewal of an existing loan
#[rstest]
#[tokio::test]
async fn test_reservation_by_other_user_blocks_renewal(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let u1 = desk.student("u1").await;
	let u2 = desk.student("u2").await;
	let book = desk.book("Statistics", 1).await;
	let loan = desk.loans().create(&u1, book.id, u1.id).await.unwrap();
	desk.reservations().create(&u2, book.id, u2.id).await.unwrap();

	let err = desk.loans().renew(&u1, loan.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Conflict);
	let unchanged = desk.loans().get(&u1, loan.id).await.unwrap();
	assert_eq!(unchanged.renewals, 0);
	assert_eq!(unchanged.due_date, date(3, 16));
}

#[rstest]
#[tokio::test]
async fn test_expired_reservation_does_not_block_renewal(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let u1 = desk.student("u1").await;
	let u2 = desk.student("u2").await;
	let book = desk.book("Probability", 1).await;
	let loan = desk.loans().create(&u1, book.id, u1.id).await.unwrap();
	desk.reservations().create(&u2, book.id, u2.id).await.unwrap();

	desk.advance_days(4);
	let renewed = desk.loans().renew(&u1, loan.id).await.unwrap();

	assert_eq!(renewed.renewals, 1);
}

#[rstest]
#[tokio::test]
async fn test_own_reservation_does_not_block_renewal(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Logic", 2).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	desk.reservations().create(&ana, book.id, ana.id).await.unwrap();

	assert!(desk.loans().renew(&ana, loan.id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_only_borrower_renews(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	let book = desk.book("Topology", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	let err = desk.loans().renew(&luis, loan.id).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test]
async fn test_loan_fulfils_borrower_reservation(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Graph Theory", 1).await;
	let reservation = desk.reservations().create(&ana, book.id, ana.id).await.unwrap();

	desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	let reservation = desk.reservations().get(&ana, reservation.id).await.unwrap();
	assert_eq!(reservation.status, ReservationStatus::Completed);
}

#[rstest]
#[tokio::test]
async fn test_loan_listing_is_scoped_to_owner(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let luis = desk.student("luis").await;
	let book = desk.book("Economics", 2).await;
	let ana_loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	let luis_loan = desk.loans().create(&luis, book.id, luis.id).await.unwrap();

	let own = desk.loans().list(&ana, None).await.unwrap();
	let all = desk.loans().list(&desk.admin, Some(LoanStatus::Active)).await.unwrap();
	let peek = desk.loans().get(&ana, luis_loan.id).await.unwrap_err();

	assert_eq!(own.iter().map(|l| l.id).collect::<Vec<_>>(), [ana_loan.id]);
	assert_eq!(all.len(), 2);
	assert_eq!(peek.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test]
async fn test_overdue_and_upcoming_listings(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("History", 2).await;
	let early = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	desk.advance_days(5);
	let later = desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	// Today is March 18: the first loan is two days late, the second due on the 21st
	desk.advance_days(12);
	let overdue = desk.loans().overdue(&desk.admin).await.unwrap();
	let upcoming = desk.loans().upcoming_due(3).await.unwrap();

	assert_eq!(overdue.iter().map(|l| l.id).collect::<Vec<_>>(), [early.id]);
	assert_eq!(upcoming.iter().map(|l| l.id).collect::<Vec<_>>(), [later.id]);
	assert_eq!(desk.loans().overdue(&ana).await.unwrap_err().kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test]
async fn test_upcoming_window_beyond_calendar_is_rejected(#[future] desk: TestLibrary) {
	let desk = desk.await;

	let err = desk.loans().upcoming_due(u32::MAX).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Validation);
}

/// `0 <= available <= total` across a mixed sequence of ledger operations
#[rstest]
#[tokio::test]
async fn test_counters_stay_within_bounds(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let students = [
		desk.student("s1").await,
		desk.student("s2").await,
		desk.student("s3").await,
	];
	let book = desk.book("Thermodynamics", 2).await;

	let mut loans = Vec::new();
	for student in &students {
		if let Ok(loan) = desk.loans().create(student, book.id, student.id).await {
			loans.push(loan);
		}
		desk.assert_counters_within_bounds().await;
	}
	assert_eq!(loans.len(), 2);

	for loan in &loans {
		desk.loans().return_loan(&desk.admin, loan.id).await.unwrap();
		let _ = desk.loans().return_loan(&desk.admin, loan.id).await;
		desk.assert_counters_within_bounds().await;
	}
	assert_eq!(desk.available(book.id).await, 2);
}
