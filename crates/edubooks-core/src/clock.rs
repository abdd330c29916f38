use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Source of wall-clock time for the loan lifecycle.
/// This allows for time mocking in tests.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;

	/// Calendar date of [`Clock::now`] in UTC
	fn today(&self) -> NaiveDate {
		self.now().date_naive()
	}
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
	pub fn new() -> Self {
		Self
	}
}

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// Mock clock for testing that allows manual time control.
#[derive(Debug, Clone)]
pub struct MockClock {
	current_time: Arc<RwLock<DateTime<Utc>>>,
}

impl MockClock {
	pub fn new(start_time: DateTime<Utc>) -> Self {
		Self {
			current_time: Arc::new(RwLock::new(start_time)),
		}
	}

	pub fn advance(&self, delta: TimeDelta) {
		let mut time = self.current_time.write();
		*time += delta;
	}

	pub fn advance_days(&self, days: i64) {
		self.advance(TimeDelta::days(days));
	}

	pub fn set_time(&self, time: DateTime<Utc>) {
		let mut current = self.current_time.write();
		*current = time;
	}
}

impl Default for MockClock {
	fn default() -> Self {
		Self::new(Utc::now())
	}
}

impl Clock for MockClock {
	fn now(&self) -> DateTime<Utc> {
		*self.current_time.read()
	}
}
