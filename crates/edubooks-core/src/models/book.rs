//! Catalog book model
//!
//! A `Book` carries both the total number of copies owned by the library and
//! the number currently on the shelf. The status is derived from the
//! availability counter except for the manual overrides `Reserved` and
//! `Maintenance`.

use crate::error::{LibraryError, Result};
use crate::ids::BookId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Earliest publication year accepted
pub const MIN_PUBLICATION_YEAR: i32 = 1000;
/// Latest publication year accepted
pub const MAX_PUBLICATION_YEAR: i32 = 2030;

/// Shelf status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BookStatus {
	Available,
	Loaned,
	Reserved,
	Maintenance,
}

impl BookStatus {
	/// Status after the availability counter changed to `available`
	///
	/// `Reserved` and `Maintenance` are set by staff and survive counter changes.
	pub fn reconcile(self, available: i32) -> Self {
		match self {
			Self::Available if available == 0 => Self::Loaned,
			Self::Loaned if available > 0 => Self::Available,
			other => other,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Available => "available",
			Self::Loaned => "loaned",
			Self::Reserved => "reserved",
			Self::Maintenance => "maintenance",
		}
	}
}

/// Persisted book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
	pub id: BookId,
	pub title: String,
	pub author: String,
	pub isbn: Option<String>,
	pub publisher: Option<String>,
	pub publication_year: Option<i32>,
	pub category: String,
	pub location: String,
	pub status: BookStatus,
	pub total_copies: i32,
	pub available_copies: i32,
	pub description: Option<String>,
	pub cover_url: Option<String>,
	pub registered_at: DateTime<Utc>,
}

impl Book {
	pub fn is_available(&self) -> bool {
		self.available_copies > 0
	}

	/// Number of copies currently out on loan
	pub fn copies_out(&self) -> i32 {
		self.total_copies - self.available_copies
	}
}

/// Payload for registering a book
///
/// When `available_copies` is omitted every copy starts on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
	pub title: String,
	pub author: String,
	#[serde(default)]
	pub isbn: Option<String>,
	#[serde(default)]
	pub publisher: Option<String>,
	#[serde(default)]
	pub publication_year: Option<i32>,
	pub category: String,
	pub location: String,
	#[serde(default = "default_copies")]
	pub total_copies: i32,
	#[serde(default)]
	pub available_copies: Option<i32>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub cover_url: Option<String>,
}

fn default_copies() -> i32 {
	1
}

impl NewBook {
	pub fn new(
		title: impl Into<String>,
		author: impl Into<String>,
		category: impl Into<String>,
		location: impl Into<String>,
		total_copies: i32,
	) -> Self {
		Self {
			title: title.into(),
			author: author.into(),
			isbn: None,
			publisher: None,
			publication_year: None,
			category: category.into(),
			location: location.into(),
			total_copies,
			available_copies: None,
			description: None,
			cover_url: None,
		}
	}

	pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
		self.isbn = Some(isbn.into());
		self
	}

	pub fn with_available(mut self, available: i32) -> Self {
		self.available_copies = Some(available);
		self
	}

	pub fn with_publication_year(mut self, year: i32) -> Self {
		self.publication_year = Some(year);
		self
	}

	/// Initial value of the availability counter
	pub fn initial_available(&self) -> i32 {
		self.available_copies.unwrap_or(self.total_copies)
	}

	/// Status a freshly registered book starts in
	pub fn initial_status(&self) -> BookStatus {
		BookStatus::Available.reconcile(self.initial_available())
	}

	pub fn validate(&self) -> Result<()> {
		if self.title.trim().is_empty() {
			return Err(LibraryError::MissingField("title"));
		}
		if self.author.trim().is_empty() {
			return Err(LibraryError::MissingField("author"));
		}
		if self.category.trim().is_empty() {
			return Err(LibraryError::MissingField("category"));
		}
		if self.location.trim().is_empty() {
			return Err(LibraryError::MissingField("location"));
		}
		validate_counters(self.total_copies, self.initial_available())?;
		validate_year(self.publication_year)
	}
}

/// Partial update of a book; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
	pub title: Option<String>,
	pub author: Option<String>,
	pub isbn: Option<String>,
	pub publisher: Option<String>,
	pub publication_year: Option<i32>,
	pub category: Option<String>,
	pub location: Option<String>,
	pub status: Option<BookStatus>,
	pub total_copies: Option<i32>,
	pub available_copies: Option<i32>,
	pub description: Option<String>,
	pub cover_url: Option<String>,
}

impl BookUpdate {
	/// Applies the update onto `book`, re-validating the counters and re-deriving the status
	pub fn apply(self, book: &mut Book) -> Result<()> {
		if let Some(title) = self.title {
			book.title = title;
		}
		if let Some(author) = self.author {
			book.author = author;
		}
		if self.isbn.is_some() {
			book.isbn = self.isbn;
		}
		if self.publisher.is_some() {
			book.publisher = self.publisher;
		}
		if self.publication_year.is_some() {
			book.publication_year = self.publication_year;
		}
		if let Some(category) = self.category {
			book.category = category;
		}
		if let Some(location) = self.location {
			book.location = location;
		}
		if let Some(status) = self.status {
			book.status = status;
		}
		if let Some(total) = self.total_copies {
			book.total_copies = total;
		}
		if let Some(available) = self.available_copies {
			book.available_copies = available;
		}
		if self.description.is_some() {
			book.description = self.description;
		}
		if self.cover_url.is_some() {
			book.cover_url = self.cover_url;
		}

		if book.title.trim().is_empty() {
			return Err(LibraryError::MissingField("title"));
		}
		validate_counters(book.total_copies, book.available_copies)?;
		validate_year(book.publication_year)?;
		book.status = book.status.reconcile(book.available_copies);
		Ok(())
	}
}

/// Search filters for the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFilter {
	/// Case-insensitive substring of the title
	pub title: Option<String>,
	pub author: Option<String>,
	pub category: Option<String>,
	pub isbn: Option<String>,
	/// Only books with at least one copy on the shelf
	#[serde(default)]
	pub available_only: bool,
}

impl BookFilter {
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn author(mut self, author: impl Into<String>) -> Self {
		self.author = Some(author.into());
		self
	}

	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	pub fn available_only(mut self) -> Self {
		self.available_only = true;
		self
	}
}

fn validate_counters(total: i32, available: i32) -> Result<()> {
	if total < 1 {
		return Err(LibraryError::Validation(
			"total copies must be at least 1".into(),
		));
	}
	if available < 0 || available > total {
		return Err(LibraryError::Validation(format!(
			"available copies ({available}) must be between 0 and total copies ({total})"
		)));
	}
	Ok(())
}

fn validate_year(year: Option<i32>) -> Result<()> {
	match year {
		Some(y) if !(MIN_PUBLICATION_YEAR..=MAX_PUBLICATION_YEAR).contains(&y) => {
			Err(LibraryError::Validation(format!(
				"publication year {y} outside {MIN_PUBLICATION_YEAR}..={MAX_PUBLICATION_YEAR}"
			)))
		}
		_ => Ok(()),
	}
}
