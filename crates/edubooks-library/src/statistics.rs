//! Circulation overview for administrators

use crate::library::Library;
use edubooks_auth::{Action, authorize};
use edubooks_core::{Result, User};
use edubooks_db::queries::books::{BookLoanCount, CatalogTotals};
use edubooks_db::queries::loans::LoanTotals;
use edubooks_db::queries::{books, loans, penalties, reservations};
use serde::Serialize;

/// Books listed as most borrowed
const TOP_BOOKS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
	pub catalog: CatalogTotals,
	pub loans: LoanTotals,
	/// Active loans already past their due date
	pub late_loans: i64,
	pub active_reservations: i64,
	pub active_penalties: i64,
	pub most_loaned: Vec<BookLoanCount>,
}

#[derive(Debug, Clone, Copy)]
pub struct Statistics<'a> {
	library: &'a Library,
}

impl<'a> Statistics<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	pub async fn overview(&self, actor: &User) -> Result<Overview> {
		authorize(actor, Action::ViewStatistics)?;
		self.collect().await
	}

	/// Gathers the overview without an acting user
	pub async fn collect(&self) -> Result<Overview> {
		let today = self.library.clock().today();
		let mut conn = self.library.database().acquire().await?;

		let catalog = books::totals(&mut conn).await?;
		let loan_totals = loans::totals(&mut conn).await?;
		let late_loans = loans::active_due_before(&mut conn, today).await?.len() as i64;
		let active_reservations = reservations::count_active(&mut conn).await?;
		let active_penalties = penalties::totals(&mut conn).await?.active;
		let most_loaned = books::most_loaned(&mut conn, TOP_BOOKS).await?;

		Ok(Overview {
			catalog,
			loans: loan_totals,
			late_loans,
			active_reservations,
			active_penalties,
			most_loaned,
		})
	}
}
