//! Permission trait and the built-in capabilities

use edubooks_core::{Role, User, UserId};

/// Outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	Allow,
	Deny(String),
}

impl Decision {
	pub fn deny(reason: impl Into<String>) -> Self {
		Self::Deny(reason.into())
	}

	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Allow)
	}

	/// Reason of a denial, `None` when allowed
	pub fn reason(&self) -> Option<&str> {
		match self {
			Self::Allow => None,
			Self::Deny(reason) => Some(reason),
		}
	}
}

/// Everything a permission may look at
///
/// `owner` is the user referenced by the record being acted upon: the
/// borrower of a loan, the holder of a reservation, the instructor of a
/// reading list.
#[derive(Debug, Clone, Copy)]
pub struct PermissionContext<'a> {
	pub actor: &'a User,
	pub owner: Option<UserId>,
}

impl<'a> PermissionContext<'a> {
	pub fn new(actor: &'a User) -> Self {
		Self { actor, owner: None }
	}

	pub fn with_owner(mut self, owner: UserId) -> Self {
		self.owner = Some(owner);
		self
	}
}

/// Permission trait
pub trait Permission: Send + Sync {
	fn check(&self, context: &PermissionContext<'_>) -> Decision;

	fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		self.check(context).is_allowed()
	}
}

impl<P: Permission + ?Sized> Permission for Box<P> {
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		(**self).check(context)
	}
}

fn require_role(context: &PermissionContext<'_>, role: Role) -> Decision {
	if context.actor.role == role {
		Decision::Allow
	} else {
		Decision::deny(format!(
			"requires the {} role, user {} is {}",
			role.as_str(),
			context.actor.id,
			context.actor.role.as_str()
		))
	}
}

/// Allows administrators only
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAdministrator;

impl Permission for IsAdministrator {
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		require_role(context, Role::Administrator)
	}
}

/// Allows instructors only
#[derive(Debug, Clone, Copy, Default)]
pub struct IsInstructor;

impl Permission for IsInstructor {
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		require_role(context, Role::Instructor)
	}
}

/// Allows students only
#[derive(Debug, Clone, Copy, Default)]
pub struct IsStudent;

impl Permission for IsStudent {
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		require_role(context, Role::Student)
	}
}

/// Allows the user the record belongs to
///
/// Denies when the context names no owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsOwner;

impl Permission for IsOwner {
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		match context.owner {
			Some(owner) if owner == context.actor.id => Decision::Allow,
			Some(owner) => Decision::deny(format!(
				"record belongs to user {owner}, not to user {}",
				context.actor.id
			)),
			None => Decision::deny("record has no owner"),
		}
	}
}

/// Allows accounts that have not been deactivated
#[derive(Debug, Clone, Copy, Default)]
pub struct IsActiveUser;

impl Permission for IsActiveUser {
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		if context.actor.is_active {
			Decision::Allow
		} else {
			Decision::deny(format!("user {} is inactive", context.actor.id))
		}
	}
}
