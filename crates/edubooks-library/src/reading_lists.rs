//! Instructor reading lists

use crate::library::Library;
use edubooks_auth::{Action, authorize};
use edubooks_core::{
	Bibliography, BibliographyFilter, BibliographyId, BibliographyUpdate, BookId, LibraryError,
	NewBibliography, ReadingList, Result, User,
};
use edubooks_db::SqliteConnection;
use edubooks_db::queries::bibliographies::{self, ListScope};
use edubooks_db::queries::books;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct ReadingLists<'a> {
	library: &'a Library,
}

impl<'a> ReadingLists<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	/// Creates a list owned by the actor; the course label is unique per instructor
	pub async fn create(&self, actor: &User, list: NewBibliography) -> Result<ReadingList> {
		authorize(actor, Action::CreateReadingList)?;
		list.validate()?;
		let now = self.library.clock().now();

		let mut tx = self.library.database().begin().await?;
		ensure_books_exist(&mut tx, &list.book_ids).await?;
		let created = bibliographies::insert(&mut tx, actor.id, &list, now).await?;
		bibliographies::replace_books(&mut tx, created.id, &list.book_ids).await?;
		let books = bibliographies::books_of(&mut tx, created.id).await?;
		tx.commit().await?;

		info!(
			bibliography_id = %created.id,
			instructor_id = %actor.id,
			course = %created.course,
			books = books.len(),
			"Reading list created"
		);
		Ok(ReadingList {
			bibliography: created,
			books,
		})
	}

	/// Updates the header fields and, when given, replaces the book set
	pub async fn update(
		&self,
		actor: &User,
		id: BibliographyId,
		update: BibliographyUpdate,
	) -> Result<ReadingList> {
		let mut tx = self.library.database().begin().await?;
		let mut list = bibliographies::fetch(&mut tx, id).await?;
		authorize(
			actor,
			Action::EditReadingList {
				instructor: list.instructor_id,
			},
		)?;
		update.apply(&mut list)?;
		if let Some(book_ids) = &update.book_ids {
			ensure_books_exist(&mut tx, book_ids).await?;
			bibliographies::replace_books(&mut tx, id, book_ids).await?;
		}
		let saved = bibliographies::save(&mut tx, &list).await?;
		let books = bibliographies::books_of(&mut tx, id).await?;
		tx.commit().await?;

		info!(bibliography_id = %id, "Reading list updated");
		Ok(ReadingList {
			bibliography: saved,
			books,
		})
	}

	pub async fn add_book(
		&self,
		actor: &User,
		id: BibliographyId,
		book_id: BookId,
	) -> Result<ReadingList> {
		let mut tx = self.library.database().begin().await?;
		let list = bibliographies::fetch(&mut tx, id).await?;
		authorize(
			actor,
			Action::EditReadingList {
				instructor: list.instructor_id,
			},
		)?;
		let book = books::fetch(&mut tx, book_id).await?;
		bibliographies::add_book(&mut tx, id, book.id)
			.await
			.map_err(|err| match err {
				LibraryError::Conflict(_) => LibraryError::Conflict(format!(
					"book {} is already in reading list {id}",
					book.id
				)),
				other => other,
			})?;
		let books = bibliographies::books_of(&mut tx, id).await?;
		tx.commit().await?;

		info!(bibliography_id = %id, book_id = %book.id, "Book added to reading list");
		Ok(ReadingList {
			bibliography: list,
			books,
		})
	}

	pub async fn remove_book(
		&self,
		actor: &User,
		id: BibliographyId,
		book_id: BookId,
	) -> Result<ReadingList> {
		let mut tx = self.library.database().begin().await?;
		let list = bibliographies::fetch(&mut tx, id).await?;
		authorize(
			actor,
			Action::EditReadingList {
				instructor: list.instructor_id,
			},
		)?;
		if !bibliographies::remove_book(&mut tx, id, book_id).await? {
			return Err(LibraryError::InvalidState(format!(
				"book {book_id} is not in reading list {id}"
			)));
		}
		let books = bibliographies::books_of(&mut tx, id).await?;
		tx.commit().await?;

		info!(bibliography_id = %id, %book_id, "Book removed from reading list");
		Ok(ReadingList {
			bibliography: list,
			books,
		})
	}

	pub async fn get(&self, actor: &User, id: BibliographyId) -> Result<ReadingList> {
		authorize(actor, Action::ViewRecord { owner: actor.id })?;
		let mut conn = self.library.database().acquire().await?;
		let list = bibliographies::fetch(&mut conn, id).await?;
		if !can_view(actor, &list) {
			return Err(LibraryError::Forbidden(format!(
				"reading list {id} is not visible to user {}",
				actor.id
			)));
		}
		let books = bibliographies::books_of(&mut conn, id).await?;
		Ok(ReadingList {
			bibliography: list,
			books,
		})
	}

	/// Lists relevant to the actor, narrowed by `filter`
	///
	/// Administrators see every list, instructors their own, students the
	/// published lists of their program.
	pub async fn list(&self, actor: &User, filter: &BibliographyFilter) -> Result<Vec<Bibliography>> {
		authorize(actor, Action::ViewRecord { owner: actor.id })?;
		let scope = if actor.is_admin() {
			ListScope::All
		} else if actor.is_instructor() {
			ListScope::Instructor(actor.id)
		} else {
			match actor.program.as_deref() {
				Some(program) => ListScope::Published(program),
				None => return Ok(Vec::new()),
			}
		};

		let mut conn = self.library.database().acquire().await?;
		bibliographies::search(&mut conn, scope, filter).await
	}

	/// Lists tagged with `program`; students only see public, active ones
	pub async fn by_program(&self, actor: &User, program: &str) -> Result<Vec<Bibliography>> {
		authorize(actor, Action::ViewRecord { owner: actor.id })?;
		let mut conn = self.library.database().acquire().await?;
		bibliographies::list_by_program(&mut conn, program, actor.is_student()).await
	}
}

fn can_view(actor: &User, list: &Bibliography) -> bool {
	if actor.is_admin() || list.is_owned_by(actor.id) {
		true
	} else if actor.is_instructor() {
		list.is_public && list.is_active
	} else {
		list.visible_to_program(actor.program.as_deref())
	}
}

async fn ensure_books_exist(conn: &mut SqliteConnection, ids: &[BookId]) -> Result<()> {
	for id in ids {
		books::fetch(conn, *id).await?;
	}
	Ok(())
}
