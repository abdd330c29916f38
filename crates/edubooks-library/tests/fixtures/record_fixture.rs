//! Helpers registering users and books through the services

use super::TestLibrary;
use edubooks_core::{Book, BookId, NewBook, NewUser, User};

pub const PROGRAM: &str = "Systems Engineering";

impl TestLibrary {
	/// Student enrolled in [`PROGRAM`]
	pub async fn student(&self, username: &str) -> User {
		self.enrolled(username, PROGRAM).await
	}

	pub async fn enrolled(&self, username: &str, program: &str) -> User {
		self.users()
			.register(NewUser::student(
				&format!("{username}@uni.edu"),
				username,
				program,
				&format!("E-{username}"),
			))
			.await
			.unwrap()
	}

	pub async fn instructor(&self, username: &str) -> User {
		self.users()
			.register(NewUser::instructor(
				&format!("{username}@uni.edu"),
				username,
				"Computer Science",
				&format!("P-{username}"),
			))
			.await
			.unwrap()
	}

	/// Book with `copies` copies, all on the shelf
	pub async fn book(&self, title: &str, copies: i32) -> Book {
		self.catalog()
			.create(
				&self.admin,
				NewBook::new(title, "Test Author", "Textbook", "Shelf A", copies),
			)
			.await
			.unwrap()
	}

	pub async fn available(&self, id: BookId) -> i32 {
		self.catalog().get(id).await.unwrap().book.available_copies
	}

	/// Every book in the catalog satisfies `0 <= available <= total`
	pub async fn assert_counters_within_bounds(&self) {
		let books = self.catalog().search(&Default::default()).await.unwrap();
		for book in books {
			assert!(
				(0..=book.total_copies).contains(&book.available_copies),
				"book {} has {} of {} copies available",
				book.id,
				book.available_copies,
				book.total_copies
			);
		}
	}
}
