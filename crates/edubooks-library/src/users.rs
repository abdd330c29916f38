//! User directory

use crate::library::Library;
use edubooks_auth::{Action, authorize};
use edubooks_core::{LibraryError, NewUser, Result, Role, User, UserFilter, UserId, UserUpdate};
use edubooks_db::queries::users::{self, UserTotals};
use tracing::info;

/// Account counters by activity and role
pub type UserStatistics = UserTotals;

#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
	library: &'a Library,
}

impl<'a> Users<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	/// Self-service sign-up for students and instructors
	pub async fn register(&self, user: NewUser) -> Result<User> {
		if user.role == Role::Administrator {
			return Err(LibraryError::Forbidden(
				"administrator accounts are created by an administrator".into(),
			));
		}
		self.provision(user).await
	}

	/// Creates an account of any role on behalf of an administrator
	pub async fn create(&self, actor: &User, user: NewUser) -> Result<User> {
		authorize(actor, Action::ManageUsers)?;
		self.provision(user).await
	}

	/// Creates an account without an acting user, as the command line does
	pub async fn provision(&self, user: NewUser) -> Result<User> {
		user.validate()?;
		let mut conn = self.library.database().acquire().await?;
		let created = users::insert(&mut conn, &user, self.library.clock().now()).await?;
		info!(
			user_id = %created.id,
			username = %created.username,
			role = created.role.as_str(),
			"User registered"
		);
		Ok(created)
	}

	pub async fn get(&self, actor: &User, id: UserId) -> Result<User> {
		authorize(actor, Action::ViewRecord { owner: id })?;
		let mut conn = self.library.database().acquire().await?;
		users::fetch(&mut conn, id).await
	}

	/// Current record of the actor's own account
	pub async fn profile(&self, actor: &User) -> Result<User> {
		self.get(actor, actor.id).await
	}

	/// Partially updates the actor's own profile
	///
	/// The role-specific fields are re-validated against the unchanged role;
	/// a taken email or username is a `Conflict`.
	pub async fn update_profile(&self, actor: &User, update: UserUpdate) -> Result<User> {
		authorize(actor, Action::EditProfile { owner: actor.id })?;

		let mut tx = self.library.database().begin().await?;
		let mut user = users::fetch(&mut tx, actor.id).await?;
		update.apply(&mut user)?;
		let saved = users::save_profile(&mut tx, &user).await?;
		tx.commit().await?;

		info!(user_id = %saved.id, username = %saved.username, "Profile updated");
		Ok(saved)
	}

	pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
		let mut conn = self.library.database().acquire().await?;
		users::find_by_username(&mut conn, username).await
	}

	pub async fn list(&self, actor: &User, filter: &UserFilter) -> Result<Vec<User>> {
		authorize(actor, Action::ManageUsers)?;
		let mut conn = self.library.database().acquire().await?;
		users::list(&mut conn, filter).await
	}

	/// Flips the active flag of `id`; administrators cannot deactivate themselves
	pub async fn toggle_active(&self, actor: &User, id: UserId) -> Result<User> {
		authorize(actor, Action::ManageUsers)?;
		if actor.id == id {
			return Err(LibraryError::InvalidState(
				"cannot change the active flag of your own account".into(),
			));
		}

		let mut tx = self.library.database().begin().await?;
		let user = users::fetch(&mut tx, id).await?;
		let updated = users::set_active(&mut tx, id, !user.is_active).await?;
		tx.commit().await?;

		info!(user_id = %id, is_active = updated.is_active, "User active flag toggled");
		Ok(updated)
	}

	/// Distinct programs students are enrolled in
	pub async fn programs(&self) -> Result<Vec<String>> {
		let mut conn = self.library.database().acquire().await?;
		users::programs(&mut conn).await
	}

	pub async fn statistics(&self, actor: &User) -> Result<UserStatistics> {
		authorize(actor, Action::ManageUsers)?;
		let mut conn = self.library.database().acquire().await?;
		users::totals(&mut conn).await
	}
}
