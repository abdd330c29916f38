//! Library fixture backed by an in-memory database

use chrono::{DateTime, TimeZone, Utc};
use edubooks_core::{LoanPolicy, MockClock, NewUser, User};
use edubooks_db::Database;
use edubooks_library::Library;
use rstest::fixture;
use std::ops::Deref;
use std::sync::Arc;

/// Wall-clock time every test starts at
pub fn opening_time() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// A library, its clock and a bootstrap administrator
pub struct TestLibrary {
	pub library: Library,
	pub clock: Arc<MockClock>,
	pub admin: User,
}

impl TestLibrary {
	pub fn advance_days(&self, days: i64) {
		self.clock.advance_days(days);
	}
}

impl Deref for TestLibrary {
	type Target = Library;

	fn deref(&self) -> &Self::Target {
		&self.library
	}
}

/// Fresh library with the default loan policy
///
/// Each test gets its own in-memory database; the clock starts at
/// [`opening_time`].
#[fixture]
pub async fn desk() -> TestLibrary {
	let db = Database::in_memory().await.unwrap();
	let clock = Arc::new(MockClock::new(opening_time()));
	let library = Library::with_clock(db, LoanPolicy::default(), clock.clone());
	let admin = library
		.users()
		.provision(NewUser::administrator("admin@uni.edu", "admin", "Circulation"))
		.await
		.unwrap();
	TestLibrary {
		library,
		clock,
		admin,
	}
}
