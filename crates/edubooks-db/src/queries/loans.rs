//! Loan queries

use chrono::{DateTime, NaiveDate, Utc};
use edubooks_core::{BookId, LibraryError, Loan, LoanId, LoanStatus, Result, UserId};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Loan counters per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LoanTotals {
	pub total: i64,
	pub active: i64,
	pub returned: i64,
	pub overdue: i64,
}

pub async fn insert(
	conn: &mut SqliteConnection,
	book_id: BookId,
	user_id: UserId,
	borrowed_at: DateTime<Utc>,
	due_date: NaiveDate,
	notes: Option<&str>,
) -> Result<Loan> {
	Ok(sqlx::query_as::<_, Loan>(
		"INSERT INTO loans (book_id, user_id, borrowed_at, due_date, status, renewals, notes) \
		 VALUES (?, ?, ?, ?, 'active', 0, ?) RETURNING *",
	)
	.bind(book_id)
	.bind(user_id)
	.bind(borrowed_at)
	.bind(due_date)
	.bind(notes)
	.fetch_one(conn)
	.await?)
}

pub async fn get(conn: &mut SqliteConnection, id: LoanId) -> Result<Option<Loan>> {
	Ok(sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = ?")
		.bind(id)
		.fetch_optional(conn)
		.await?)
}

pub async fn fetch(conn: &mut SqliteConnection, id: LoanId) -> Result<Loan> {
	get(conn, id)
		.await?
		.ok_or_else(|| LibraryError::not_found("Loan", id))
}

/// Persists status, dates, renewal count and notes
pub async fn save(conn: &mut SqliteConnection, loan: &Loan) -> Result<Loan> {
	let saved = sqlx::query_as::<_, Loan>(
		"UPDATE loans SET due_date = ?, returned_at = ?, status = ?, renewals = ?, notes = ? \
		 WHERE id = ? RETURNING *",
	)
	.bind(loan.due_date)
	.bind(loan.returned_at)
	.bind(loan.status)
	.bind(loan.renewals)
	.bind(&loan.notes)
	.bind(loan.id)
	.fetch_optional(conn)
	.await?;
	saved.ok_or_else(|| LibraryError::not_found("Loan", loan.id))
}

/// Moves an `active` loan to `status`; `false` when it was no longer active
pub async fn transition_from_active(
	conn: &mut SqliteConnection,
	id: LoanId,
	status: LoanStatus,
) -> Result<bool> {
	let result = sqlx::query("UPDATE loans SET status = ? WHERE id = ? AND status = 'active'")
		.bind(status)
		.bind(id)
		.execute(conn)
		.await?;
	Ok(result.rows_affected() == 1)
}

/// Loans newest first, optionally restricted to one borrower and one status
pub async fn list(
	conn: &mut SqliteConnection,
	user_id: Option<UserId>,
	status: Option<LoanStatus>,
) -> Result<Vec<Loan>> {
	let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM loans WHERE 1 = 1");
	if let Some(user_id) = user_id {
		query.push(" AND user_id = ").push_bind(user_id);
	}
	if let Some(status) = status {
		query.push(" AND status = ").push_bind(status);
	}
	query.push(" ORDER BY borrowed_at DESC, id DESC");
	Ok(query.build_query_as::<Loan>().fetch_all(conn).await?)
}

/// Active loans whose due date is strictly before `cutoff`
pub async fn active_due_before(conn: &mut SqliteConnection, cutoff: NaiveDate) -> Result<Vec<Loan>> {
	Ok(sqlx::query_as::<_, Loan>(
		"SELECT * FROM loans WHERE status = 'active' AND due_date < ? ORDER BY due_date, id",
	)
	.bind(cutoff)
	.fetch_all(conn)
	.await?)
}

/// Active loans due within `[from, to]`
pub async fn active_due_between(
	conn: &mut SqliteConnection,
	from: NaiveDate,
	to: NaiveDate,
) -> Result<Vec<Loan>> {
	Ok(sqlx::query_as::<_, Loan>(
		"SELECT * FROM loans WHERE status = 'active' AND due_date >= ? AND due_date <= ? \
		 ORDER BY due_date, id",
	)
	.bind(from)
	.bind(to)
	.fetch_all(conn)
	.await?)
}

/// Loans of `book_id` whose copy is still out (`active` or `overdue`)
pub async fn count_outstanding_for_book(
	conn: &mut SqliteConnection,
	book_id: BookId,
) -> Result<i64> {
	let (count,): (i64,) = sqlx::query_as(
		"SELECT COUNT(*) FROM loans WHERE book_id = ? AND status IN ('active', 'overdue')",
	)
	.bind(book_id)
	.fetch_one(conn)
	.await?;
	Ok(count)
}

pub async fn totals(conn: &mut SqliteConnection) -> Result<LoanTotals> {
	Ok(sqlx::query_as::<_, LoanTotals>(
		"SELECT COUNT(*) AS total, \
		 COALESCE(SUM(status = 'active'), 0) AS active, \
		 COALESCE(SUM(status = 'returned'), 0) AS returned, \
		 COALESCE(SUM(status = 'overdue'), 0) AS overdue FROM loans",
	)
	.fetch_one(conn)
	.await?)
}

/// Overdue loans (flagged, or active past `today`) without any penalty attached
pub async fn count_overdue_without_penalty(
	conn: &mut SqliteConnection,
	today: NaiveDate,
) -> Result<i64> {
	let (count,): (i64,) = sqlx::query_as(
		"SELECT COUNT(*) FROM loans l \
		 WHERE (l.status = 'overdue' OR (l.status = 'active' AND l.due_date < ?)) \
		 AND NOT EXISTS (SELECT 1 FROM penalties p WHERE p.loan_id = l.id)",
	)
	.bind(today)
	.fetch_one(conn)
	.await?;
	Ok(count)
}
