//! Reservation queries

use chrono::{DateTime, Utc};
use edubooks_core::{
	BookId, LibraryError, Reservation, ReservationId, ReservationStatus, Result, UserId,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Inserts an active reservation
///
/// A second active reservation for the same pair violates the partial unique
/// index and surfaces as `Conflict`.
pub async fn insert(
	conn: &mut SqliteConnection,
	book_id: BookId,
	user_id: UserId,
	reserved_at: DateTime<Utc>,
	expires_at: DateTime<Utc>,
) -> Result<Reservation> {
	Ok(sqlx::query_as::<_, Reservation>(
		"INSERT INTO reservations (book_id, user_id, reserved_at, status, expires_at) \
		 VALUES (?, ?, ?, 'active', ?) RETURNING *",
	)
	.bind(book_id)
	.bind(user_id)
	.bind(reserved_at)
	.bind(expires_at)
	.fetch_one(conn)
	.await?)
}

pub async fn get(conn: &mut SqliteConnection, id: ReservationId) -> Result<Option<Reservation>> {
	Ok(
		sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
			.bind(id)
			.fetch_optional(conn)
			.await?,
	)
}

pub async fn fetch(conn: &mut SqliteConnection, id: ReservationId) -> Result<Reservation> {
	get(conn, id)
		.await?
		.ok_or_else(|| LibraryError::not_found("Reservation", id))
}

pub async fn find_active(
	conn: &mut SqliteConnection,
	book_id: BookId,
	user_id: UserId,
) -> Result<Option<Reservation>> {
	Ok(sqlx::query_as::<_, Reservation>(
		"SELECT * FROM reservations WHERE book_id = ? AND user_id = ? AND status = 'active'",
	)
	.bind(book_id)
	.bind(user_id)
	.fetch_optional(conn)
	.await?)
}

/// First unexpired active reservation on `book_id` held by someone other than `user_id`
pub async fn live_held_by_other(
	conn: &mut SqliteConnection,
	book_id: BookId,
	user_id: UserId,
	now: DateTime<Utc>,
) -> Result<Option<Reservation>> {
	Ok(sqlx::query_as::<_, Reservation>(
		"SELECT * FROM reservations \
		 WHERE book_id = ? AND user_id != ? AND status = 'active' AND expires_at > ? \
		 ORDER BY reserved_at LIMIT 1",
	)
	.bind(book_id)
	.bind(user_id)
	.bind(now)
	.fetch_optional(conn)
	.await?)
}

pub async fn list(
	conn: &mut SqliteConnection,
	user_id: Option<UserId>,
	status: Option<ReservationStatus>,
) -> Result<Vec<Reservation>> {
	let mut query: QueryBuilder<'_, Sqlite> =
		QueryBuilder::new("SELECT * FROM reservations WHERE 1 = 1");
	if let Some(user_id) = user_id {
		query.push(" AND user_id = ").push_bind(user_id);
	}
	if let Some(status) = status {
		query.push(" AND status = ").push_bind(status);
	}
	query.push(" ORDER BY reserved_at DESC, id DESC");
	Ok(query.build_query_as::<Reservation>().fetch_all(conn).await?)
}

/// Moves an active reservation to `status`; `false` when it was no longer active
pub async fn transition_from_active(
	conn: &mut SqliteConnection,
	id: ReservationId,
	status: ReservationStatus,
) -> Result<bool> {
	let result =
		sqlx::query("UPDATE reservations SET status = ? WHERE id = ? AND status = 'active'")
			.bind(status)
			.bind(id)
			.execute(conn)
			.await?;
	Ok(result.rows_affected() == 1)
}

/// Completes the active reservation of `user_id` on `book_id`, if any
pub async fn complete_active(
	conn: &mut SqliteConnection,
	book_id: BookId,
	user_id: UserId,
) -> Result<u64> {
	let result = sqlx::query(
		"UPDATE reservations SET status = 'completed' \
		 WHERE book_id = ? AND user_id = ? AND status = 'active'",
	)
	.bind(book_id)
	.bind(user_id)
	.execute(conn)
	.await?;
	Ok(result.rows_affected())
}

/// Cancels active reservations whose hold ended at or before `now`
pub async fn expire_stale(conn: &mut SqliteConnection, now: DateTime<Utc>) -> Result<u64> {
	let result = sqlx::query(
		"UPDATE reservations SET status = 'cancelled' WHERE status = 'active' AND expires_at <= ?",
	)
	.bind(now)
	.execute(conn)
	.await?;
	Ok(result.rows_affected())
}

pub async fn count_active_for_book(conn: &mut SqliteConnection, book_id: BookId) -> Result<i64> {
	let (count,): (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE book_id = ? AND status = 'active'")
			.bind(book_id)
			.fetch_one(conn)
			.await?;
	Ok(count)
}

pub async fn count_active(conn: &mut SqliteConnection) -> Result<i64> {
	let (count,): (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE status = 'active'")
			.fetch_one(conn)
			.await?;
	Ok(count)
}
