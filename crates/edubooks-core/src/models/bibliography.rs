//! Reading list (bibliography) model

use super::book::Book;
use crate::error::{LibraryError, Result};
use crate::ids::{BibliographyId, BookId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted reading list header; books are kept in a join table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bibliography {
	pub id: BibliographyId,
	pub instructor_id: UserId,
	pub course: String,
	pub program: Option<String>,
	pub description: Option<String>,
	pub is_public: bool,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
}

impl Bibliography {
	pub fn is_owned_by(&self, user: UserId) -> bool {
		self.instructor_id == user
	}

	/// Whether a student enrolled in `program` may see this list
	pub fn visible_to_program(&self, program: Option<&str>) -> bool {
		self.is_public && self.is_active && program.is_some() && self.program.as_deref() == program
	}
}

/// A reading list together with its books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingList {
	#[serde(flatten)]
	pub bibliography: Bibliography,
	pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBibliography {
	pub course: String,
	#[serde(default)]
	pub program: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default = "default_true")]
	pub is_public: bool,
	#[serde(default)]
	pub book_ids: Vec<BookId>,
}

fn default_true() -> bool {
	true
}

impl NewBibliography {
	pub fn new(course: impl Into<String>) -> Self {
		Self {
			course: course.into(),
			program: None,
			description: None,
			is_public: true,
			book_ids: Vec::new(),
		}
	}

	pub fn program(mut self, program: impl Into<String>) -> Self {
		self.program = Some(program.into());
		self
	}

	pub fn books(mut self, ids: impl IntoIterator<Item = BookId>) -> Self {
		self.book_ids = ids.into_iter().collect();
		self
	}

	pub fn private(mut self) -> Self {
		self.is_public = false;
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.course.trim().is_empty() {
			return Err(LibraryError::MissingField("course"));
		}
		Ok(())
	}
}

/// Partial update of a reading list
///
/// `book_ids`, when present, replaces the whole book set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographyUpdate {
	pub course: Option<String>,
	pub program: Option<String>,
	pub description: Option<String>,
	pub is_public: Option<bool>,
	pub is_active: Option<bool>,
	pub book_ids: Option<Vec<BookId>>,
}

impl BibliographyUpdate {
	/// Applies the header fields; the book set is handled by the store
	pub fn apply(&self, bibliography: &mut Bibliography) -> Result<()> {
		if let Some(course) = &self.course {
			if course.trim().is_empty() {
				return Err(LibraryError::MissingField("course"));
			}
			bibliography.course.clone_from(course);
		}
		if self.program.is_some() {
			bibliography.program.clone_from(&self.program);
		}
		if self.description.is_some() {
			bibliography.description.clone_from(&self.description);
		}
		if let Some(is_public) = self.is_public {
			bibliography.is_public = is_public;
		}
		if let Some(is_active) = self.is_active {
			bibliography.is_active = is_active;
		}
		Ok(())
	}
}

/// Filters for listing reading lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographyFilter {
	/// Case-insensitive substring of the program
	pub program: Option<String>,
	/// Case-insensitive substring of the course label
	pub course: Option<String>,
	pub is_active: Option<bool>,
}

impl BibliographyFilter {
	pub fn program(mut self, program: impl Into<String>) -> Self {
		self.program = Some(program.into());
		self
	}

	pub fn course(mut self, course: impl Into<String>) -> Self {
		self.course = Some(course.into());
		self
	}

	pub fn active(mut self, is_active: bool) -> Self {
		self.is_active = Some(is_active);
		self
	}
}
