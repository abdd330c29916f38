//! Reading list queries

use super::like_pattern;
use chrono::{DateTime, Utc};
use edubooks_core::{
	Bibliography, BibliographyFilter, BibliographyId, Book, BookId, LibraryError, NewBibliography,
	Result, UserId,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Which lists a search may return before the filter applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope<'a> {
	All,
	Instructor(UserId),
	/// Public, active lists tagged with exactly this program
	Published(&'a str),
}

pub async fn insert(
	conn: &mut SqliteConnection,
	instructor_id: UserId,
	list: &NewBibliography,
	created_at: DateTime<Utc>,
) -> Result<Bibliography> {
	Ok(sqlx::query_as::<_, Bibliography>(
		"INSERT INTO bibliographies (instructor_id, course, program, description, is_public, \
		 is_active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?) RETURNING *",
	)
	.bind(instructor_id)
	.bind(&list.course)
	.bind(&list.program)
	.bind(&list.description)
	.bind(list.is_public)
	.bind(created_at)
	.fetch_one(conn)
	.await?)
}

pub async fn get(conn: &mut SqliteConnection, id: BibliographyId) -> Result<Option<Bibliography>> {
	Ok(
		sqlx::query_as::<_, Bibliography>("SELECT * FROM bibliographies WHERE id = ?")
			.bind(id)
			.fetch_optional(conn)
			.await?,
	)
}

pub async fn fetch(conn: &mut SqliteConnection, id: BibliographyId) -> Result<Bibliography> {
	get(conn, id)
		.await?
		.ok_or_else(|| LibraryError::not_found("Bibliography", id))
}

pub async fn save(conn: &mut SqliteConnection, list: &Bibliography) -> Result<Bibliography> {
	let saved = sqlx::query_as::<_, Bibliography>(
		"UPDATE bibliographies SET course = ?, program = ?, description = ?, is_public = ?, \
		 is_active = ? WHERE id = ? RETURNING *",
	)
	.bind(&list.course)
	.bind(&list.program)
	.bind(&list.description)
	.bind(list.is_public)
	.bind(list.is_active)
	.bind(list.id)
	.fetch_optional(conn)
	.await?;
	saved.ok_or_else(|| LibraryError::not_found("Bibliography", list.id))
}

/// Lists within `scope` matching `filter`, ordered by course
pub async fn search(
	conn: &mut SqliteConnection,
	scope: ListScope<'_>,
	filter: &BibliographyFilter,
) -> Result<Vec<Bibliography>> {
	let mut query: QueryBuilder<'_, Sqlite> =
		QueryBuilder::new("SELECT * FROM bibliographies WHERE 1 = 1");
	match scope {
		ListScope::All => {}
		ListScope::Instructor(instructor_id) => {
			query.push(" AND instructor_id = ").push_bind(instructor_id);
		}
		ListScope::Published(program) => {
			query
				.push(" AND is_public = 1 AND is_active = 1 AND program = ")
				.push_bind(program.to_string());
		}
	}

	let text_filters = [("program", &filter.program), ("course", &filter.course)];
	for (column, value) in text_filters {
		if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
			query
				.push(" AND ")
				.push(column)
				.push(" LIKE ")
				.push_bind(like_pattern(value))
				.push(" ESCAPE '\\'");
		}
	}
	if let Some(is_active) = filter.is_active {
		query.push(" AND is_active = ").push_bind(is_active);
	}
	query.push(" ORDER BY course COLLATE NOCASE, id");

	Ok(query.build_query_as::<Bibliography>().fetch_all(conn).await?)
}

/// Lists tagged with `program`; `published_only` keeps only public, active lists
pub async fn list_by_program(
	conn: &mut SqliteConnection,
	program: &str,
	published_only: bool,
) -> Result<Vec<Bibliography>> {
	let sql = if published_only {
		"SELECT * FROM bibliographies WHERE program = ? AND is_public = 1 AND is_active = 1 \
		 ORDER BY course COLLATE NOCASE, id"
	} else {
		"SELECT * FROM bibliographies WHERE program = ? ORDER BY course COLLATE NOCASE, id"
	};
	Ok(sqlx::query_as::<_, Bibliography>(sql)
		.bind(program)
		.fetch_all(conn)
		.await?)
}

pub async fn books_of(conn: &mut SqliteConnection, id: BibliographyId) -> Result<Vec<Book>> {
	Ok(sqlx::query_as::<_, Book>(
		"SELECT b.* FROM books b JOIN bibliography_books bb ON bb.book_id = b.id \
		 WHERE bb.bibliography_id = ? ORDER BY b.title COLLATE NOCASE, b.id",
	)
	.bind(id)
	.fetch_all(conn)
	.await?)
}

/// Links a book; an existing link is a `Conflict`
pub async fn add_book(
	conn: &mut SqliteConnection,
	id: BibliographyId,
	book_id: BookId,
) -> Result<()> {
	sqlx::query("INSERT INTO bibliography_books (bibliography_id, book_id) VALUES (?, ?)")
		.bind(id)
		.bind(book_id)
		.execute(conn)
		.await?;
	Ok(())
}

/// Unlinks a book; `false` when it was not in the list
pub async fn remove_book(
	conn: &mut SqliteConnection,
	id: BibliographyId,
	book_id: BookId,
) -> Result<bool> {
	let result =
		sqlx::query("DELETE FROM bibliography_books WHERE bibliography_id = ? AND book_id = ?")
			.bind(id)
			.bind(book_id)
			.execute(conn)
			.await?;
	Ok(result.rows_affected() == 1)
}

/// Replaces the book set; duplicate ids are collapsed
pub async fn replace_books(
	conn: &mut SqliteConnection,
	id: BibliographyId,
	book_ids: &[BookId],
) -> Result<()> {
	sqlx::query("DELETE FROM bibliography_books WHERE bibliography_id = ?")
		.bind(id)
		.execute(&mut *conn)
		.await?;
	for book_id in book_ids {
		sqlx::query(
			"INSERT OR IGNORE INTO bibliography_books (bibliography_id, book_id) VALUES (?, ?)",
		)
		.bind(id)
		.bind(*book_id)
		.execute(&mut *conn)
		.await?;
	}
	Ok(())
}
