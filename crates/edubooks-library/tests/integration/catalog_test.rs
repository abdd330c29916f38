//! Integration tests for the catalog

use crate::fixtures::{TestLibrary, desk};
use edubooks_core::{BookFilter, BookStatus, BookUpdate, ErrorKind, LoanStatus, NewBook};
use edubooks_library::SweepOptions;
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn test_only_administrators_manage_books(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = NewBook::new("Dune", "Frank Herbert", "Novel", "N-1", 1);

	let err = desk.catalog().create(&ana, book.clone()).await.unwrap_err();
	let created = desk.catalog().create(&desk.admin, book).await.unwrap();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert_eq!(created.available_copies, 1);
	assert_eq!(created.status, BookStatus::Available);
}

#[rstest]
#[tokio::test]
async fn test_update_rederives_status(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let book = desk.book("Emma", 2).await;

	let update = BookUpdate {
		available_copies: Some(0),
		..Default::default()
	};
	let updated = desk.catalog().update(&desk.admin, book.id, update).await.unwrap();

	assert_eq!(updated.status, BookStatus::Loaned);
}

#[rstest]
#[tokio::test]
async fn test_update_rejects_counter_above_total(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let book = desk.book("Persuasion", 2).await;

	let update = BookUpdate {
		total_copies: Some(1),
		..Default::default()
	};
	let err = desk.catalog().update(&desk.admin, book.id, update).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Validation);
	assert_eq!(desk.catalog().get(book.id).await.unwrap().book.total_copies, 2);
}

#[rstest]
#[tokio::test]
async fn test_maintenance_override_survives_update(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let book = desk.book("Ulysses", 1).await;
	let maintenance = BookUpdate {
		status: Some(BookStatus::Maintenance),
		..Default::default()
	};
	desk.catalog().update(&desk.admin, book.id, maintenance).await.unwrap();

	let relocated = BookUpdate {
		location: Some("Bindery".into()),
		..Default::default()
	};
	let updated = desk.catalog().update(&desk.admin, book.id, relocated).await.unwrap();

	assert_eq!(updated.status, BookStatus::Maintenance);
	assert_eq!(updated.location, "Bindery");
}

#[rstest]
#[tokio::test]
async fn test_delete_refused_while_on_loan(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Middlemarch", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();

	let err = desk.catalog().delete(&desk.admin, book.id).await.unwrap_err();
	desk.loans().return_loan(&desk.admin, loan.id).await.unwrap();
	desk.catalog().delete(&desk.admin, book.id).await.unwrap();

	assert_eq!(err.kind(), ErrorKind::InvalidState);
	assert_eq!(desk.catalog().get(book.id).await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[rstest]
#[tokio::test]
async fn test_delete_refused_while_loan_is_overdue(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Bleak House", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	desk.advance_days(20);
	desk.sweep().execute(SweepOptions::default()).await.unwrap();

	// Act
	let err = desk.catalog().delete(&desk.admin, book.id).await.unwrap_err();

	// Assert
	assert_eq!(err.kind(), ErrorKind::InvalidState);
	let loan = desk.loans().get(&desk.admin, loan.id).await.unwrap();
	assert_eq!(loan.status, LoanStatus::Overdue);
	assert_eq!(desk.catalog().get(book.id).await.unwrap().outstanding_loans, 1);
	let fines = desk.penalties().list(&desk.admin, None).await.unwrap();
	assert_eq!(fines[0].loan_id, Some(loan.id));
}

#[rstest]
#[tokio::test]
async fn test_update_cannot_shelve_copies_on_loan(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Persuasion", 1).await;
	let loan = desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	let restock = BookUpdate {
		available_copies: Some(1),
		..Default::default()
	};

	// Act
	let err = desk
		.catalog()
		.update(&desk.admin, book.id, restock)
		.await
		.unwrap_err();

	// Assert
	assert_eq!(err.kind(), ErrorKind::Validation);
	assert_eq!(desk.available(book.id).await, 0);
	let returned = desk.loans().return_loan(&desk.admin, loan.id).await.unwrap();
	assert_eq!(returned.loan.status, LoanStatus::Returned);
	assert_eq!(desk.available(book.id).await, 1);
}

#[rstest]
#[tokio::test]
async fn test_update_may_add_copies_while_on_loan(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Emma", 1).await;
	desk.loans().create(&ana, book.id, ana.id).await.unwrap();
	let update = BookUpdate {
		total_copies: Some(3),
		available_copies: Some(2),
		..Default::default()
	};

	let saved = desk.catalog().update(&desk.admin, book.id, update).await.unwrap();

	assert_eq!(saved.available_copies, 2);
	assert_eq!(saved.status, BookStatus::Available);
}

#[rstest]
#[tokio::test]
async fn test_search_and_categories(#[future] desk: TestLibrary) {
	let desk = desk.await;
	for (title, author, category) in [
		("The Trial", "Franz Kafka", "Novel"),
		("The Castle", "Franz Kafka", "Novel"),
		("Meditations", "Marcus Aurelius", "Philosophy"),
	] {
		desk.catalog()
			.create(&desk.admin, NewBook::new(title, author, category, "S-2", 1))
			.await
			.unwrap();
	}

	let kafka = desk
		.catalog()
		.search(&BookFilter::default().author("KAFKA"))
		.await
		.unwrap();
	let titles: Vec<_> = kafka.iter().map(|b| b.title.as_str()).collect();

	assert_eq!(titles, ["The Castle", "The Trial"]);
	assert_eq!(desk.catalog().categories().await.unwrap(), ["Novel", "Philosophy"]);
}

#[rstest]
#[tokio::test]
async fn test_load_skips_catalogued_isbn(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let known = NewBook::new("Dune", "Frank Herbert", "Novel", "N-1", 1).with_isbn("9780441013593");
	desk.catalog().create(&desk.admin, known.clone()).await.unwrap();
	let fresh = NewBook::new("Emma", "Jane Austen", "Novel", "N-2", 2).with_isbn("9780141439587");

	let outcome = desk.catalog().load(vec![known, fresh]).await.unwrap();

	assert_eq!(outcome.created.len(), 1);
	assert_eq!(outcome.created[0].title, "Emma");
	assert_eq!(outcome.existing.len(), 1);
	assert_eq!(outcome.existing[0].title, "Dune");
}

#[rstest]
#[tokio::test]
async fn test_load_rejects_whole_batch_on_invalid_entry(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let good = NewBook::new("Emma", "Jane Austen", "Novel", "N-2", 2);
	let bad = NewBook::new("", "Nobody", "Novel", "N-3", 1);

	let err = desk.catalog().load(vec![good, bad]).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::MissingField);
	let books = desk.catalog().search(&BookFilter::default()).await.unwrap();
	assert!(books.is_empty());
}
