//! Catalog queries

use super::like_pattern;
use chrono::{DateTime, Utc};
use edubooks_core::{Book, BookFilter, BookId, BookStatus, LibraryError, NewBook, Result};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// A book with the number of loans ever made on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct BookLoanCount {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub book: Book,
	pub loan_count: i64,
}

/// Catalog-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CatalogTotals {
	pub titles: i64,
	/// Titles with at least one copy on the shelf
	pub available_titles: i64,
	pub copies: i64,
	pub available_copies: i64,
}

pub async fn insert(
	conn: &mut SqliteConnection,
	book: &NewBook,
	registered_at: DateTime<Utc>,
) -> Result<Book> {
	let created = sqlx::query_as::<_, Book>(
		"INSERT INTO books (title, author, isbn, publisher, publication_year, category, location, \
		 status, total_copies, available_copies, description, cover_url, registered_at) \
		 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
	)
	.bind(&book.title)
	.bind(&book.author)
	.bind(&book.isbn)
	.bind(&book.publisher)
	.bind(book.publication_year)
	.bind(&book.category)
	.bind(&book.location)
	.bind(book.initial_status())
	.bind(book.total_copies)
	.bind(book.initial_available())
	.bind(&book.description)
	.bind(&book.cover_url)
	.bind(registered_at)
	.fetch_one(conn)
	.await?;
	Ok(created)
}

pub async fn get(conn: &mut SqliteConnection, id: BookId) -> Result<Option<Book>> {
	Ok(sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
		.bind(id)
		.fetch_optional(conn)
		.await?)
}

/// Like [`get`] but a missing book is `NotFound`
pub async fn fetch(conn: &mut SqliteConnection, id: BookId) -> Result<Book> {
	get(conn, id)
		.await?
		.ok_or_else(|| LibraryError::not_found("Book", id))
}

pub async fn find_by_isbn(conn: &mut SqliteConnection, isbn: &str) -> Result<Option<Book>> {
	Ok(sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = ?")
		.bind(isbn)
		.fetch_optional(conn)
		.await?)
}

/// Writes every mutable column of `book`
pub async fn save(conn: &mut SqliteConnection, book: &Book) -> Result<Book> {
	let saved = sqlx::query_as::<_, Book>(
		"UPDATE books SET title = ?, author = ?, isbn = ?, publisher = ?, publication_year = ?, \
		 category = ?, location = ?, status = ?, total_copies = ?, available_copies = ?, \
		 description = ?, cover_url = ? WHERE id = ? RETURNING *",
	)
	.bind(&book.title)
	.bind(&book.author)
	.bind(&book.isbn)
	.bind(&book.publisher)
	.bind(book.publication_year)
	.bind(&book.category)
	.bind(&book.location)
	.bind(book.status)
	.bind(book.total_copies)
	.bind(book.available_copies)
	.bind(&book.description)
	.bind(&book.cover_url)
	.bind(book.id)
	.fetch_optional(conn)
	.await?;
	saved.ok_or_else(|| LibraryError::not_found("Book", book.id))
}

pub async fn delete(conn: &mut SqliteConnection, id: BookId) -> Result<bool> {
	let result = sqlx::query("DELETE FROM books WHERE id = ?")
		.bind(id)
		.execute(conn)
		.await?;
	Ok(result.rows_affected() == 1)
}

/// Takes one copy off the shelf; `false` when none is left
pub async fn decrement_available(conn: &mut SqliteConnection, id: BookId) -> Result<bool> {
	let result = sqlx::query(
		"UPDATE books SET available_copies = available_copies - 1 \
		 WHERE id = ? AND available_copies > 0",
	)
	.bind(id)
	.execute(conn)
	.await?;
	Ok(result.rows_affected() == 1)
}

/// Puts one copy back; `false` when every copy is already on the shelf
pub async fn increment_available(conn: &mut SqliteConnection, id: BookId) -> Result<bool> {
	let result = sqlx::query(
		"UPDATE books SET available_copies = available_copies + 1 \
		 WHERE id = ? AND available_copies < total_copies",
	)
	.bind(id)
	.execute(conn)
	.await?;
	Ok(result.rows_affected() == 1)
}

pub async fn set_status(conn: &mut SqliteConnection, id: BookId, status: BookStatus) -> Result<()> {
	sqlx::query("UPDATE books SET status = ? WHERE id = ?")
		.bind(status)
		.bind(id)
		.execute(conn)
		.await?;
	Ok(())
}

/// Re-derives the status from the availability counter
pub async fn sync_status(conn: &mut SqliteConnection, id: BookId) -> Result<Book> {
	let mut book = fetch(&mut *conn, id).await?;
	let status = book.status.reconcile(book.available_copies);
	if status != book.status {
		set_status(&mut *conn, id, status).await?;
		tracing::debug!(book_id = %id, from = book.status.as_str(), to = status.as_str(), "Book status synchronized");
		book.status = status;
	}
	Ok(book)
}

/// Case-insensitive substring search, ordered by title
pub async fn search(conn: &mut SqliteConnection, filter: &BookFilter) -> Result<Vec<Book>> {
	let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM books WHERE 1 = 1");

	let text_filters = [
		("title", &filter.title),
		("author", &filter.author),
		("category", &filter.category),
		("isbn", &filter.isbn),
	];
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
	if filter.available_only {
		query.push(" AND available_copies > 0");
	}
	query.push(" ORDER BY title COLLATE NOCASE, id");

	Ok(query.build_query_as::<Book>().fetch_all(conn).await?)
}

/// Distinct categories, sorted
pub async fn categories(conn: &mut SqliteConnection) -> Result<Vec<String>> {
	let rows: Vec<(String,)> =
		sqlx::query_as("SELECT DISTINCT category FROM books ORDER BY category COLLATE NOCASE")
			.fetch_all(conn)
			.await?;
	Ok(rows.into_iter().map(|(category,)| category).collect())
}

pub async fn totals(conn: &mut SqliteConnection) -> Result<CatalogTotals> {
	Ok(sqlx::query_as::<_, CatalogTotals>(
		"SELECT COUNT(*) AS titles, COALESCE(SUM(available_copies > 0), 0) AS available_titles, \
		 COALESCE(SUM(total_copies), 0) AS copies, \
		 COALESCE(SUM(available_copies), 0) AS available_copies FROM books",
	)
	.fetch_one(conn)
	.await?)
}

/// Books ordered by how often they were borrowed
pub async fn most_loaned(conn: &mut SqliteConnection, limit: i64) -> Result<Vec<BookLoanCount>> {
	Ok(sqlx::query_as::<_, BookLoanCount>(
		"SELECT b.*, COUNT(l.id) AS loan_count FROM books b \
		 JOIN loans l ON l.book_id = b.id \
		 GROUP BY b.id ORDER BY loan_count DESC, b.title LIMIT ?",
	)
	.bind(limit)
	.fetch_all(conn)
	.await?)
}
