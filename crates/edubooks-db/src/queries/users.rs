//! User directory queries

use super::like_pattern;
use chrono::{DateTime, Utc};
use edubooks_core::{LibraryError, NewUser, Result, Role, User, UserFilter, UserId};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Account counters by activity and role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserTotals {
	pub total: i64,
	pub active: i64,
	pub inactive: i64,
	pub students: i64,
	pub instructors: i64,
	pub administrators: i64,
}

pub async fn insert(
	conn: &mut SqliteConnection,
	user: &NewUser,
	joined_at: DateTime<Utc>,
) -> Result<User> {
	Ok(sqlx::query_as::<_, User>(
		"INSERT INTO users (email, username, first_name, last_name, role, program, enrollment_id, \
		 department, employee_id, area, is_active, joined_at) \
		 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?) RETURNING *",
	)
	.bind(&user.email)
	.bind(&user.username)
	.bind(&user.first_name)
	.bind(&user.last_name)
	.bind(user.role)
	.bind(&user.program)
	.bind(&user.enrollment_id)
	.bind(&user.department)
	.bind(&user.employee_id)
	.bind(&user.area)
	.bind(joined_at)
	.fetch_one(conn)
	.await?)
}

pub async fn get(conn: &mut SqliteConnection, id: UserId) -> Result<Option<User>> {
	Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
		.bind(id)
		.fetch_optional(conn)
		.await?)
}

pub async fn fetch(conn: &mut SqliteConnection, id: UserId) -> Result<User> {
	get(conn, id)
		.await?
		.ok_or_else(|| LibraryError::not_found("User", id))
}

pub async fn find_by_username(conn: &mut SqliteConnection, username: &str) -> Result<Option<User>> {
	Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
		.bind(username)
		.fetch_optional(conn)
		.await?)
}

pub async fn list(conn: &mut SqliteConnection, filter: &UserFilter) -> Result<Vec<User>> {
	let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM users WHERE 1 = 1");
	if let Some(role) = filter.role {
		query.push(" AND role = ").push_bind(role);
	}
	if let Some(is_active) = filter.is_active {
		query.push(" AND is_active = ").push_bind(is_active);
	}
	if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
		let pattern = like_pattern(search);
		query.push(" AND (");
		for (i, column) in ["username", "email", "first_name", "last_name"].iter().enumerate() {
			if i > 0 {
				query.push(" OR ");
			}
			query
				.push(*column)
				.push(" LIKE ")
				.push_bind(pattern.clone())
				.push(" ESCAPE '\\'");
		}
		query.push(")");
	}
	query.push(" ORDER BY username");
	Ok(query.build_query_as::<User>().fetch_all(conn).await?)
}

pub async fn set_active(conn: &mut SqliteConnection, id: UserId, is_active: bool) -> Result<User> {
	let updated = sqlx::query_as::<_, User>("UPDATE users SET is_active = ? WHERE id = ? RETURNING *")
		.bind(is_active)
		.bind(id)
		.fetch_optional(conn)
		.await?;
	updated.ok_or_else(|| LibraryError::not_found("User", id))
}

/// Writes the editable profile fields of `user`
pub async fn save_profile(conn: &mut SqliteConnection, user: &User) -> Result<User> {
	let updated = sqlx::query_as::<_, User>(
		"UPDATE users SET email = ?, username = ?, first_name = ?, last_name = ?, program = ?, \
		 enrollment_id = ?, department = ?, employee_id = ?, area = ? WHERE id = ? RETURNING *",
	)
	.bind(&user.email)
	.bind(&user.username)
	.bind(&user.first_name)
	.bind(&user.last_name)
	.bind(&user.program)
	.bind(&user.enrollment_id)
	.bind(&user.department)
	.bind(&user.employee_id)
	.bind(&user.area)
	.bind(user.id)
	.fetch_optional(conn)
	.await?;
	updated.ok_or_else(|| LibraryError::not_found("User", user.id))
}

/// Distinct programs of students, sorted
pub async fn programs(conn: &mut SqliteConnection) -> Result<Vec<String>> {
	let rows: Vec<(String,)> = sqlx::query_as(
		"SELECT DISTINCT program FROM users \
		 WHERE role = ? AND program IS NOT NULL AND TRIM(program) != '' ORDER BY program",
	)
	.bind(Role::Student)
	.fetch_all(conn)
	.await?;
	Ok(rows.into_iter().map(|(program,)| program).collect())
}

pub async fn totals(conn: &mut SqliteConnection) -> Result<UserTotals> {
	Ok(sqlx::query_as::<_, UserTotals>(
		"SELECT COUNT(*) AS total, \
		 COALESCE(SUM(is_active = 1), 0) AS active, \
		 COALESCE(SUM(is_active = 0), 0) AS inactive, \
		 COALESCE(SUM(role = 'student'), 0) AS students, \
		 COALESCE(SUM(role = 'instructor'), 0) AS instructors, \
		 COALESCE(SUM(role = 'administrator'), 0) AS administrators FROM users",
	)
	.fetch_one(conn)
	.await?)
}
