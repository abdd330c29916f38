use crate::ids::UserId;
use thiserror::Error;

/// Errors returned by library operations
#[derive(Debug, Error)]
pub enum LibraryError {
	/// Referenced entity does not exist
	#[error("{entity} not found: {id}")]
	NotFound { entity: &'static str, id: i64 },

	/// No copies left, or the resource is busy
	#[error("Unavailable: {0}")]
	Unavailable(String),

	/// Duplicate reservation, or a reservation blocking a renewal
	#[error("Conflict: {0}")]
	Conflict(String),

	/// Renewal cap reached
	#[error("Limit reached: maximum of {limit} renewals")]
	LimitReached { limit: i32 },

	/// The user has an active penalty and cannot borrow
	#[error("User {user_id} has active penalties")]
	Sanctioned { user_id: UserId },

	/// Operation attempted from the wrong status
	#[error("Invalid state: {0}")]
	InvalidState(String),

	/// A required field was not provided
	#[error("Missing field: {0}")]
	MissingField(&'static str),

	/// Access control denied the operation
	#[error("Forbidden: {0}")]
	Forbidden(String),

	/// A field value breaks a record invariant
	#[error("Validation error: {0}")]
	Validation(String),

	/// Error from the backing store
	#[error("Database error: {0}")]
	Database(#[source] sqlx::Error),
}

/// Discriminant of [`LibraryError`] for callers that branch on the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	NotFound,
	Unavailable,
	Conflict,
	LimitReached,
	Sanctioned,
	InvalidState,
	MissingField,
	Forbidden,
	Validation,
	Database,
}

impl LibraryError {
	/// Shorthand for [`LibraryError::NotFound`]
	pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
		Self::NotFound {
			entity,
			id: id.into(),
		}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::NotFound { .. } => ErrorKind::NotFound,
			Self::Unavailable(_) => ErrorKind::Unavailable,
			Self::Conflict(_) => ErrorKind::Conflict,
			Self::LimitReached { .. } => ErrorKind::LimitReached,
			Self::Sanctioned { .. } => ErrorKind::Sanctioned,
			Self::InvalidState(_) => ErrorKind::InvalidState,
			Self::MissingField(_) => ErrorKind::MissingField,
			Self::Forbidden(_) => ErrorKind::Forbidden,
			Self::Validation(_) => ErrorKind::Validation,
			Self::Database(_) => ErrorKind::Database,
		}
	}
}

impl From<sqlx::Error> for LibraryError {
	fn from(err: sqlx::Error) -> Self {
		// Unique indexes back the duplicate checks, so a violation is a conflict
		if let sqlx::Error::Database(db_err) = &err
			&& db_err.is_unique_violation()
		{
			return Self::Conflict(db_err.message().to_string());
		}
		Self::Database(err)
	}
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;
