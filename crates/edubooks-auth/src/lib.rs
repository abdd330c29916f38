//! # edubooks-auth
//!
//! Role-based access control consulted before every library operation.
//!
//! Permissions are small values implementing [`Permission`]; they answer with a
//! [`Decision`] carrying a reason when denied, and compose with `&`, `|` and `!`.
//! Each operation is described by an [`Action`], and [`authorize`] is the
//! single entry point the services call.
//!
//! ## Example
//!
//! ```rust
//! use edubooks_auth::{IsInstructor, IsOwner, Permission, PermissionContext};
//! # use edubooks_core::{Role, User, UserId};
//! # let instructor = User {
//! #     id: UserId(7), email: "p@uni.edu".into(), username: "prof".into(),
//! #     first_name: String::new(), last_name: String::new(), role: Role::Instructor,
//! #     program: None, enrollment_id: None, department: Some("Física".into()),
//! #     employee_id: Some("E-1".into()), area: None, is_active: true,
//! #     joined_at: chrono::Utc::now(),
//! # };
//!
//! let edit_reading_list = IsInstructor & IsOwner;
//!
//! let own = PermissionContext::new(&instructor).with_owner(UserId(7));
//! assert!(edit_reading_list.check(&own).is_allowed());
//!
//! let foreign = PermissionContext::new(&instructor).with_owner(UserId(8));
//! assert!(!edit_reading_list.check(&foreign).is_allowed());
//! ```

pub mod action;
pub mod permission;
pub mod permission_operators;

pub use action::{Action, authorize};
pub use permission::{
	Decision, IsActiveUser, IsAdministrator, IsInstructor, IsOwner, IsStudent, Permission,
	PermissionContext,
};
pub use permission_operators::{AndPermission, NotPermission, OrPermission};
