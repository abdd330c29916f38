//! Book catalog

use crate::library::Library;
use edubooks_auth::{Action, authorize};
use edubooks_core::{Book, BookFilter, BookId, BookUpdate, LibraryError, NewBook, Result, User};
use edubooks_db::queries::{books, loans, reservations};
use serde::Serialize;
use tracing::info;

/// A book with its current circulation counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDetail {
	#[serde(flatten)]
	pub book: Book,
	/// Loans whose copy is still out, overdue ones included
	pub outstanding_loans: i64,
	pub active_reservations: i64,
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogLoad {
	pub created: Vec<Book>,
	/// Entries whose ISBN was already catalogued
	pub existing: Vec<Book>,
}

/// Catalog service
///
/// Reads are open to everyone; writes require [`Action::ManageCatalog`].
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
	library: &'a Library,
}

impl<'a> Catalog<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	/// Registers a book; `available_copies` defaults to `total_copies`
	pub async fn create(&self, actor: &User, book: NewBook) -> Result<Book> {
		authorize(actor, Action::ManageCatalog)?;
		book.validate()?;

		let mut conn = self.library.database().acquire().await?;
		let created = books::insert(&mut conn, &book, self.library.clock().now()).await?;
		info!(book_id = %created.id, title = %created.title, "Book registered");
		Ok(created)
	}

	/// Registers many books in one transaction without an acting user
	///
	/// A book whose ISBN is already catalogued is left untouched and reported
	/// in [`CatalogLoad::existing`]. Any invalid entry aborts the whole load.
	pub async fn load(&self, entries: Vec<NewBook>) -> Result<CatalogLoad> {
		for entry in &entries {
			entry.validate()?;
		}
		let now = self.library.clock().now();
		let mut outcome = CatalogLoad::default();

		let mut tx = self.library.database().begin().await?;
		for entry in &entries {
			let existing = match entry.isbn.as_deref() {
				Some(isbn) => books::find_by_isbn(&mut tx, isbn).await?,
				None => None,
			};
			match existing {
				Some(book) => outcome.existing.push(book),
				None => outcome.created.push(books::insert(&mut tx, entry, now).await?),
			}
		}
		tx.commit().await?;

		info!(
			created = outcome.created.len(),
			existing = outcome.existing.len(),
			"Catalog loaded"
		);
		Ok(outcome)
	}

	/// Applies a partial update, re-validating the counters
	///
	/// The copies off the shelf (`total - available`) may not drop below the
	/// number of outstanding loans, or those loans could never be returned.
	pub async fn update(&self, actor: &User, id: BookId, update: BookUpdate) -> Result<Book> {
		authorize(actor, Action::ManageCatalog)?;

		let mut tx = self.library.database().begin().await?;
		let mut book = books::fetch(&mut tx, id).await?;
		update.apply(&mut book)?;
		let outstanding = loans::count_outstanding_for_book(&mut tx, book.id).await?;
		let off_shelf = i64::from(book.total_copies - book.available_copies);
		if off_shelf < outstanding {
			return Err(LibraryError::Validation(format!(
				"book {} has {outstanding} copies on loan but only {off_shelf} off the shelf",
				book.id
			)));
		}
		let saved = books::save(&mut tx, &book).await?;
		tx.commit().await?;

		info!(book_id = %saved.id, status = saved.status.as_str(), "Book updated");
		Ok(saved)
	}

	/// Removes a book none of whose copies is out on loan
	pub async fn delete(&self, actor: &User, id: BookId) -> Result<()> {
		authorize(actor, Action::ManageCatalog)?;

		let mut tx = self.library.database().begin().await?;
		let book = books::fetch(&mut tx, id).await?;
		let outstanding = loans::count_outstanding_for_book(&mut tx, book.id).await?;
		if outstanding > 0 {
			return Err(LibraryError::InvalidState(format!(
				"book {} still has {outstanding} outstanding loan(s)",
				book.id
			)));
		}
		books::delete(&mut tx, book.id).await?;
		tx.commit().await?;

		info!(book_id = %id, title = %book.title, "Book deleted");
		Ok(())
	}

	pub async fn get(&self, id: BookId) -> Result<BookDetail> {
		let mut conn = self.library.database().acquire().await?;
		let book = books::fetch(&mut conn, id).await?;
		let outstanding_loans = loans::count_outstanding_for_book(&mut conn, id).await?;
		let active_reservations = reservations::count_active_for_book(&mut conn, id).await?;
		Ok(BookDetail {
			book,
			outstanding_loans,
			active_reservations,
		})
	}

	pub async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>> {
		let mut conn = self.library.database().acquire().await?;
		books::search(&mut conn, filter).await
	}

	/// Distinct categories, sorted
	pub async fn categories(&self) -> Result<Vec<String>> {
		let mut conn = self.library.database().acquire().await?;
		books::categories(&mut conn).await
	}
}
