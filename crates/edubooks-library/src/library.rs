//! The [`Library`] handle

use crate::catalog::Catalog;
use crate::loans::Loans;
use crate::penalties::Penalties;
use crate::reading_lists::ReadingLists;
use crate::reservations::Reservations;
use crate::statistics::Statistics;
use crate::sweep::Sweep;
use crate::users::Users;
use edubooks_core::{Clock, LoanPolicy, SystemClock};
use edubooks_db::Database;
use std::fmt;
use std::sync::Arc;

/// Shared entry point to every library service
///
/// Cloning is cheap: the pool and the clock are reference counted.
#[derive(Clone)]
pub struct Library {
	db: Database,
	policy: LoanPolicy,
	clock: Arc<dyn Clock>,
}

impl Library {
	/// Library reading the system time
	pub fn new(db: Database, policy: LoanPolicy) -> Self {
		Self::with_clock(db, policy, Arc::new(SystemClock::new()))
	}

	pub fn with_clock(db: Database, policy: LoanPolicy, clock: Arc<dyn Clock>) -> Self {
		Self { db, policy, clock }
	}

	pub fn database(&self) -> &Database {
		&self.db
	}

	pub fn policy(&self) -> &LoanPolicy {
		&self.policy
	}

	pub fn clock(&self) -> &dyn Clock {
		self.clock.as_ref()
	}

	pub fn catalog(&self) -> Catalog<'_> {
		Catalog::new(self)
	}

	pub fn loans(&self) -> Loans<'_> {
		Loans::new(self)
	}

	pub fn reservations(&self) -> Reservations<'_> {
		Reservations::new(self)
	}

	pub fn penalties(&self) -> Penalties<'_> {
		Penalties::new(self)
	}

	pub fn sweep(&self) -> Sweep<'_> {
		Sweep::new(self)
	}

	pub fn reading_lists(&self) -> ReadingLists<'_> {
		ReadingLists::new(self)
	}

	pub fn users(&self) -> Users<'_> {
		Users::new(self)
	}

	pub fn statistics(&self) -> Statistics<'_> {
		Statistics::new(self)
	}
}

impl fmt::Debug for Library {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Library")
			.field("db", &self.db)
			.field("policy", &self.policy)
			.field("now", &self.clock.now())
			.finish()
	}
}
