//! Permission Operators
//!
//! Provides logical operators (AND, OR, NOT) for composing permissions.
//! Supports both builder-style composition (`AndPermission::new()`) and
//! operator-based composition (`&`, `|`, `!`).

use crate::permission::{
	Decision, IsActiveUser, IsAdministrator, IsInstructor, IsOwner, IsStudent, Permission,
	PermissionContext,
};
use std::ops::{BitAnd, BitOr, Not};

/// AND permission operator
///
/// Both permissions must allow; the first denial is reported.
#[derive(Debug, Clone, Copy)]
pub struct AndPermission<A, B> {
	left: A,
	right: B,
}

impl<A, B> AndPermission<A, B> {
	pub fn new(left: A, right: B) -> Self {
		Self { left, right }
	}
}

impl<A, B> Permission for AndPermission<A, B>
where
	A: Permission,
	B: Permission,
{
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		match self.left.check(context) {
			Decision::Allow => self.right.check(context),
			denied => denied,
		}
	}
}

/// OR permission operator
///
/// Either permission may allow; when both deny the reasons are joined.
#[derive(Debug, Clone, Copy)]
pub struct OrPermission<A, B> {
	left: A,
	right: B,
}

impl<A, B> OrPermission<A, B> {
	pub fn new(left: A, right: B) -> Self {
		Self { left, right }
	}
}

impl<A, B> Permission for OrPermission<A, B>
where
	A: Permission,
	B: Permission,
{
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		match (self.left.check(context), self.right.check(context)) {
			(Decision::Deny(left), Decision::Deny(right)) => {
				Decision::Deny(format!("{left}; {right}"))
			}
			_ => Decision::Allow,
		}
	}
}

/// NOT permission operator
#[derive(Debug, Clone, Copy)]
pub struct NotPermission<P> {
	inner: P,
}

impl<P> NotPermission<P> {
	pub fn new(inner: P) -> Self {
		Self { inner }
	}
}

impl<P> Permission for NotPermission<P>
where
	P: Permission,
{
	fn check(&self, context: &PermissionContext<'_>) -> Decision {
		match self.inner.check(context) {
			Decision::Allow => Decision::deny("negated permission was satisfied"),
			Decision::Deny(_) => Decision::Allow,
		}
	}
}

// Orphan rules require one impl per concrete permission type
macro_rules! impl_permission_operators {
	($type:ty) => {
		impl<B: Permission> BitAnd<B> for $type {
			type Output = AndPermission<Self, B>;

			fn bitand(self, rhs: B) -> Self::Output {
				AndPermission::new(self, rhs)
			}
		}

		impl<B: Permission> BitOr<B> for $type {
			type Output = OrPermission<Self, B>;

			fn bitor(self, rhs: B) -> Self::Output {
				OrPermission::new(self, rhs)
			}
		}

		impl Not for $type {
			type Output = NotPermission<Self>;

			fn not(self) -> Self::Output {
				NotPermission::new(self)
			}
		}
	};
}

impl_permission_operators!(IsAdministrator);
impl_permission_operators!(IsInstructor);
impl_permission_operators!(IsStudent);
impl_permission_operators!(IsOwner);
impl_permission_operators!(IsActiveUser);

// Composite types chain as well
impl<A: Permission, B: Permission, C: Permission> BitAnd<C> for AndPermission<A, B> {
	type Output = AndPermission<Self, C>;

	fn bitand(self, rhs: C) -> Self::Output {
		AndPermission::new(self, rhs)
	}
}

impl<A: Permission, B: Permission, C: Permission> BitOr<C> for AndPermission<A, B> {
	type Output = OrPermission<Self, C>;

	fn bitor(self, rhs: C) -> Self::Output {
		OrPermission::new(self, rhs)
	}
}

impl<A: Permission, B: Permission> Not for AndPermission<A, B> {
	type Output = NotPermission<Self>;

	fn not(self) -> Self::Output {
		NotPermission::new(self)
	}
}

impl<A: Permission, B: Permission, C: Permission> BitAnd<C> for OrPermission<A, B> {
	type Output = AndPermission<Self, C>;

	fn bitand(self, rhs: C) -> Self::Output {
		AndPermission::new(self, rhs)
	}
}

impl<A: Permission, B: Permission, C: Permission> BitOr<C> for OrPermission<A, B> {
	type Output = OrPermission<Self, C>;

	fn bitor(self, rhs: C) -> Self::Output {
		OrPermission::new(self, rhs)
	}
}

impl<A: Permission, B: Permission> Not for OrPermission<A, B> {
	type Output = NotPermission<Self>;

	fn not(self) -> Self::Output {
		NotPermission::new(self)
	}
}

impl<P: Permission, B: Permission> BitAnd<B> for NotPermission<P> {
	type Output = AndPermission<Self, B>;

	fn bitand(self, rhs: B) -> Self::Output {
		AndPermission::new(self, rhs)
	}
}

impl<P: Permission, B: Permission> BitOr<B> for NotPermission<P> {
	type Output = OrPermission<Self, B>;

	fn bitor(self, rhs: B) -> Self::Output {
		OrPermission::new(self, rhs)
	}
}

impl<P: Permission> Not for NotPermission<P> {
	type Output = NotPermission<Self>;

	fn not(self) -> Self::Output {
		NotPermission::new(self)
	}
}
