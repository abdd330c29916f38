//! Integration tests for the user directory

use crate::fixtures::{PROGRAM, TestLibrary, desk};
use edubooks_core::{ErrorKind, NewUser, Role, UserFilter, UserUpdate};
use rstest::rstest;

#[rstest]
#[case(NewUser { program: None, ..NewUser::student("a@uni.edu", "a", "x", "E-1") }, "program")]
#[case(NewUser { employee_id: None, ..NewUser::instructor("b@uni.edu", "b", "Math", "P-1") }, "employee_id")]
#[tokio::test]
async fn test_role_attributes_are_required(
	#[future] desk: TestLibrary,
	#[case] user: NewUser,
	#[case] field: &str,
) {
	let desk = desk.await;

	let err = desk.users().register(user).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::MissingField);
	assert!(err.to_string().contains(field));
}

#[rstest]
#[tokio::test]
async fn test_duplicate_username_is_conflict(#[future] desk: TestLibrary) {
	let desk = desk.await;
	desk.student("ana").await;

	let err = desk
		.users()
		.register(NewUser::student("other@uni.edu", "ana", PROGRAM, "E-2"))
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[rstest]
#[tokio::test]
async fn test_administrators_are_not_self_registered(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let admin = NewUser::administrator("boss@uni.edu", "boss", "Library");

	let err = desk.users().register(admin.clone()).await.unwrap_err();
	let created = desk.users().create(&desk.admin, admin).await.unwrap();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert_eq!(created.role, Role::Administrator);
}

#[rstest]
#[tokio::test]
async fn test_toggle_active_locks_out_user(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let book = desk.book("Rhetoric", 1).await;

	let ana = desk.users().toggle_active(&desk.admin, ana.id).await.unwrap();
	let err = desk.loans().create(&ana, book.id, ana.id).await.unwrap_err();
	let on_behalf = desk.loans().create(&desk.admin, book.id, ana.id).await.unwrap_err();

	assert!(!ana.is_active);
	assert_eq!(err.kind(), ErrorKind::Forbidden);
	assert_eq!(on_behalf.kind(), ErrorKind::Forbidden);

	let ana = desk.users().toggle_active(&desk.admin, ana.id).await.unwrap();
	assert!(ana.is_active);
	assert!(desk.loans().create(&ana, book.id, ana.id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_cannot_toggle_own_account(#[future] desk: TestLibrary) {
	let desk = desk.await;

	let err = desk
		.users()
		.toggle_active(&desk.admin, desk.admin.id)
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[rstest]
#[tokio::test]
async fn test_listing_programs_and_statistics(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	desk.enrolled("leo", "Law").await;
	desk.instructor("prof").await;

	let students = desk
		.users()
		.list(&desk.admin, &UserFilter {
			role: Some(Role::Student),
			..Default::default()
		})
		.await
		.unwrap();
	let stats = desk.users().statistics(&desk.admin).await.unwrap();

	assert_eq!(students.len(), 2);
	assert_eq!(desk.users().programs().await.unwrap(), ["Law", PROGRAM]);
	assert_eq!(stats.total, 4);
	assert_eq!((stats.students, stats.instructors, stats.administrators), (2, 1, 1));
	assert_eq!(
		desk.users().list(&ana, &UserFilter::default()).await.unwrap_err().kind(),
		ErrorKind::Forbidden
	);
}

#[rstest]
#[tokio::test]
async fn test_user_edits_own_profile(#[future] desk: TestLibrary) {
	// Arrange
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let update = UserUpdate {
		first_name: Some("Ana".into()),
		program: Some("Mathematics".into()),
		..Default::default()
	};

	// Act
	let saved = desk.users().update_profile(&ana, update).await.unwrap();

	// Assert
	assert_eq!(saved.first_name, "Ana");
	assert_eq!(saved.program.as_deref(), Some("Mathematics"));
	assert_eq!(saved.enrollment_id, ana.enrollment_id);
	assert_eq!(saved.role, Role::Student);
	assert_eq!(desk.users().profile(&ana).await.unwrap(), saved);
}

#[rstest]
#[tokio::test]
async fn test_profile_edit_keeps_role_fields_valid(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let update = UserUpdate {
		enrollment_id: Some(" ".into()),
		..Default::default()
	};

	let err = desk.users().update_profile(&ana, update).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::MissingField);
	let unchanged = desk.users().profile(&ana).await.unwrap();
	assert_eq!(unchanged.enrollment_id, ana.enrollment_id);
}

#[rstest]
#[tokio::test]
async fn test_profile_edit_cannot_take_another_username(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	desk.student("ben").await;
	let update = UserUpdate {
		username: Some("ben".into()),
		..Default::default()
	};

	let err = desk.users().update_profile(&ana, update).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[rstest]
#[tokio::test]
async fn test_inactive_user_cannot_edit_profile(#[future] desk: TestLibrary) {
	let desk = desk.await;
	let ana = desk.student("ana").await;
	let ana = desk.users().toggle_active(&desk.admin, ana.id).await.unwrap();

	let err = desk
		.users()
		.update_profile(&ana, UserUpdate::default())
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Forbidden);
}
