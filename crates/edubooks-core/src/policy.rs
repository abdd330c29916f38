//! Loan policy constants

use crate::error::{LibraryError, Result};
use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOAN_DAYS: u32 = 15;
pub const DEFAULT_MAX_RENEWALS: i32 = 2;
pub const DEFAULT_RESERVATION_DAYS: u32 = 3;
pub const DEFAULT_DAILY_FINE: i64 = 5000;

/// Upper bound for any configurable period (loans, holds, suspensions, windows)
pub const MAX_PERIOD_DAYS: u32 = 3650;

/// Tunable rules of the loan lifecycle
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use edubooks_core::LoanPolicy;
///
/// let policy = LoanPolicy::default();
/// let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// assert_eq!(policy.due_date_from(start), NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
/// assert_eq!(policy.fine_for(3), 15_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPolicy {
	/// Length of a loan and of each renewal, in days
	pub loan_days: u32,
	/// Number of renewals allowed per loan
	pub max_renewals: i32,
	/// How long a reservation is held, in days
	pub reservation_days: u32,
	/// Fine per day of delay, in whole currency units
	pub daily_fine: i64,
}

impl Default for LoanPolicy {
	fn default() -> Self {
		Self {
			loan_days: DEFAULT_LOAN_DAYS,
			max_renewals: DEFAULT_MAX_RENEWALS,
			reservation_days: DEFAULT_RESERVATION_DAYS,
			daily_fine: DEFAULT_DAILY_FINE,
		}
	}
}

impl LoanPolicy {
	/// Due date of a loan started (or renewed) on `date`
	pub fn due_date_from(&self, date: NaiveDate) -> NaiveDate {
		date.checked_add_days(Days::new(u64::from(self.loan_days)))
			.unwrap_or(NaiveDate::MAX)
	}

	pub fn fine_for(&self, days_late: i64) -> i64 {
		fine_for(days_late, self.daily_fine)
	}
}

/// `date` moved `days` forward
pub fn days_after(date: NaiveDate, days: u32) -> Result<NaiveDate> {
	date.checked_add_days(Days::new(u64::from(days)))
		.ok_or_else(|| out_of_range(days))
}

/// `date` moved `days` back
pub fn days_before(date: NaiveDate, days: u32) -> Result<NaiveDate> {
	date.checked_sub_days(Days::new(u64::from(days)))
		.ok_or_else(|| out_of_range(days))
}

/// `at` moved `days` forward
pub fn instant_after(at: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
	TimeDelta::try_days(i64::from(days))
		.and_then(|delta| at.checked_add_signed(delta))
		.ok_or_else(|| out_of_range(days))
}

fn out_of_range(days: u32) -> LibraryError {
	LibraryError::Validation(format!("{days} day(s) is outside the supported date range"))
}

/// Fine for `days_late` days at `daily_rate`; zero when not late
pub fn fine_for(days_late: i64, daily_rate: i64) -> i64 {
	days_late.max(0).saturating_mul(daily_rate)
}
