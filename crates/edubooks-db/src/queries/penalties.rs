//! Penalty queries

use chrono::{DateTime, Utc};
use edubooks_core::{
	LibraryError, LoanId, Penalty, PenaltyId, PenaltyKind, PenaltyStatus, Result, UserId,
};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Columns of a penalty about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyRow<'a> {
	pub user_id: UserId,
	pub loan_id: Option<LoanId>,
	pub kind: PenaltyKind,
	pub amount: Option<i64>,
	pub suspension_days: Option<i32>,
	pub description: &'a str,
	pub start_at: DateTime<Utc>,
	pub end_at: Option<DateTime<Utc>>,
}

/// Penalty counters per status plus the outstanding fine total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PenaltyTotals {
	pub total: i64,
	pub active: i64,
	pub paid: i64,
	pub completed: i64,
	pub active_fines: i64,
	pub active_suspensions: i64,
	/// Sum of the amounts of active fines
	pub outstanding_amount: i64,
}

/// Users ranked by number of active penalties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserPenaltyCount {
	pub user_id: UserId,
	pub username: String,
	pub penalty_count: i64,
	pub total_amount: i64,
}

pub async fn insert(conn: &mut SqliteConnection, row: &PenaltyRow<'_>) -> Result<Penalty> {
	Ok(sqlx::query_as::<_, Penalty>(
		"INSERT INTO penalties (user_id, loan_id, kind, amount, suspension_days, description, \
		 start_at, end_at, status) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active') RETURNING *",
	)
	.bind(row.user_id)
	.bind(row.loan_id)
	.bind(row.kind)
	.bind(row.amount)
	.bind(row.suspension_days)
	.bind(row.description)
	.bind(row.start_at)
	.bind(row.end_at)
	.fetch_one(conn)
	.await?)
}

pub async fn get(conn: &mut SqliteConnection, id: PenaltyId) -> Result<Option<Penalty>> {
	Ok(sqlx::query_as::<_, Penalty>("SELECT * FROM penalties WHERE id = ?")
		.bind(id)
		.fetch_optional(conn)
		.await?)
}

pub async fn fetch(conn: &mut SqliteConnection, id: PenaltyId) -> Result<Penalty> {
	get(conn, id)
		.await?
		.ok_or_else(|| LibraryError::not_found("Penalty", id))
}

/// Persists status and end time
pub async fn save(conn: &mut SqliteConnection, penalty: &Penalty) -> Result<Penalty> {
	let saved = sqlx::query_as::<_, Penalty>(
		"UPDATE penalties SET status = ?, end_at = ? WHERE id = ? RETURNING *",
	)
	.bind(penalty.status)
	.bind(penalty.end_at)
	.bind(penalty.id)
	.fetch_optional(conn)
	.await?;
	saved.ok_or_else(|| LibraryError::not_found("Penalty", penalty.id))
}

pub async fn list(
	conn: &mut SqliteConnection,
	user_id: Option<UserId>,
	status: Option<PenaltyStatus>,
) -> Result<Vec<Penalty>> {
	let mut query: QueryBuilder<'_, Sqlite> =
		QueryBuilder::new("SELECT * FROM penalties WHERE 1 = 1");
	if let Some(user_id) = user_id {
		query.push(" AND user_id = ").push_bind(user_id);
	}
	if let Some(status) = status {
		query.push(" AND status = ").push_bind(status);
	}
	query.push(" ORDER BY start_at DESC, id DESC");
	Ok(query.build_query_as::<Penalty>().fetch_all(conn).await?)
}

/// Whether any penalty, whatever its status, references `loan_id`
pub async fn exists_for_loan(conn: &mut SqliteConnection, loan_id: LoanId) -> Result<bool> {
	let (exists,): (bool,) =
		sqlx::query_as("SELECT EXISTS (SELECT 1 FROM penalties WHERE loan_id = ?)")
			.bind(loan_id)
			.fetch_one(conn)
			.await?;
	Ok(exists)
}

pub async fn has_active(conn: &mut SqliteConnection, user_id: UserId) -> Result<bool> {
	let (exists,): (bool,) = sqlx::query_as(
		"SELECT EXISTS (SELECT 1 FROM penalties WHERE user_id = ? AND status = 'active')",
	)
	.bind(user_id)
	.fetch_one(conn)
	.await?;
	Ok(exists)
}

/// Completes active suspensions whose end is at or before `now`
pub async fn complete_elapsed_suspensions(
	conn: &mut SqliteConnection,
	now: DateTime<Utc>,
) -> Result<u64> {
	let result = sqlx::query(
		"UPDATE penalties SET status = 'completed' \
		 WHERE status = 'active' AND kind = 'suspension' AND end_at IS NOT NULL AND end_at <= ?",
	)
	.bind(now)
	.execute(conn)
	.await?;
	Ok(result.rows_affected())
}

pub async fn totals(conn: &mut SqliteConnection) -> Result<PenaltyTotals> {
	Ok(sqlx::query_as::<_, PenaltyTotals>(
		"SELECT COUNT(*) AS total, \
		 COALESCE(SUM(status = 'active'), 0) AS active, \
		 COALESCE(SUM(status = 'paid'), 0) AS paid, \
		 COALESCE(SUM(status = 'completed'), 0) AS completed, \
		 COALESCE(SUM(status = 'active' AND kind = 'fine'), 0) AS active_fines, \
		 COALESCE(SUM(status = 'active' AND kind = 'suspension'), 0) AS active_suspensions, \
		 COALESCE(SUM(CASE WHEN status = 'active' AND kind = 'fine' THEN amount END), 0) \
		 AS outstanding_amount FROM penalties",
	)
	.fetch_one(conn)
	.await?)
}

pub async fn top_users(conn: &mut SqliteConnection, limit: i64) -> Result<Vec<UserPenaltyCount>> {
	Ok(sqlx::query_as::<_, UserPenaltyCount>(
		"SELECT u.id AS user_id, u.username AS username, COUNT(p.id) AS penalty_count, \
		 COALESCE(SUM(CASE WHEN p.kind = 'fine' THEN p.amount END), 0) AS total_amount \
		 FROM penalties p JOIN users u ON u.id = p.user_id WHERE p.status = 'active' \
		 GROUP BY u.id ORDER BY penalty_count DESC, total_amount DESC, u.username LIMIT ?",
	)
	.bind(limit)
	.fetch_all(conn)
	.await?)
}
