//! User accounts and role-specific attributes

use super::is_present;
use crate::error::{LibraryError, Result};
use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
	Student,
	Instructor,
	Administrator,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Student => "student",
			Self::Instructor => "instructor",
			Self::Administrator => "administrator",
		}
	}
}

impl std::str::FromStr for Role {
	type Err = LibraryError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_ascii_lowercase().as_str() {
			"student" => Ok(Self::Student),
			"instructor" => Ok(Self::Instructor),
			"administrator" | "admin" => Ok(Self::Administrator),
			other => Err(LibraryError::Validation(format!("unknown role '{other}'"))),
		}
	}
}

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub username: String,
	pub first_name: String,
	pub last_name: String,
	pub role: Role,
	/// Student career
	pub program: Option<String>,
	pub enrollment_id: Option<String>,
	pub department: Option<String>,
	pub employee_id: Option<String>,
	/// Administrative area
	pub area: Option<String>,
	pub is_active: bool,
	pub joined_at: DateTime<Utc>,
}

impl User {
	pub fn is_admin(&self) -> bool {
		self.role == Role::Administrator
	}

	pub fn is_instructor(&self) -> bool {
		self.role == Role::Instructor
	}

	pub fn is_student(&self) -> bool {
		self.role == Role::Student
	}

	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
	pub email: String,
	pub username: String,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name: String,
	pub role: Role,
	#[serde(default)]
	pub program: Option<String>,
	#[serde(default)]
	pub enrollment_id: Option<String>,
	#[serde(default)]
	pub department: Option<String>,
	#[serde(default)]
	pub employee_id: Option<String>,
	#[serde(default)]
	pub area: Option<String>,
}

impl NewUser {
	fn base(email: &str, username: &str, role: Role) -> Self {
		Self {
			email: email.to_string(),
			username: username.to_string(),
			first_name: String::new(),
			last_name: String::new(),
			role,
			program: None,
			enrollment_id: None,
			department: None,
			employee_id: None,
			area: None,
		}
	}

	pub fn student(email: &str, username: &str, program: &str, enrollment_id: &str) -> Self {
		Self {
			program: Some(program.to_string()),
			enrollment_id: Some(enrollment_id.to_string()),
			..Self::base(email, username, Role::Student)
		}
	}

	pub fn instructor(email: &str, username: &str, department: &str, employee_id: &str) -> Self {
		Self {
			department: Some(department.to_string()),
			employee_id: Some(employee_id.to_string()),
			..Self::base(email, username, Role::Instructor)
		}
	}

	pub fn administrator(email: &str, username: &str, area: &str) -> Self {
		Self {
			area: Some(area.to_string()),
			..Self::base(email, username, Role::Administrator)
		}
	}

	pub fn named(mut self, first_name: &str, last_name: &str) -> Self {
		self.first_name = first_name.to_string();
		self.last_name = last_name.to_string();
		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.email.trim().is_empty() || !self.email.contains('@') {
			return Err(LibraryError::Validation(format!(
				"invalid email '{}'",
				self.email
			)));
		}
		if self.username.trim().is_empty() {
			return Err(LibraryError::MissingField("username"));
		}
		match self.role {
			Role::Student => {
				if !is_present(self.program.as_deref()) {
					return Err(LibraryError::MissingField("program"));
				}
				if !is_present(self.enrollment_id.as_deref()) {
					return Err(LibraryError::MissingField("enrollment_id"));
				}
			}
			Role::Instructor => {
				if !is_present(self.department.as_deref()) {
					return Err(LibraryError::MissingField("department"));
				}
				if !is_present(self.employee_id.as_deref()) {
					return Err(LibraryError::MissingField("employee_id"));
				}
			}
			Role::Administrator => {
				if !is_present(self.area.as_deref()) {
					return Err(LibraryError::MissingField("area"));
				}
			}
		}
		Ok(())
	}
}

impl From<&User> for NewUser {
	fn from(user: &User) -> Self {
		Self {
			email: user.email.clone(),
			username: user.username.clone(),
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
			role: user.role,
			program: user.program.clone(),
			enrollment_id: user.enrollment_id.clone(),
			department: user.department.clone(),
			employee_id: user.employee_id.clone(),
			area: user.area.clone(),
		}
	}
}

/// Self-service profile edit; `None` leaves the field unchanged
///
/// The role, the active flag and the join date are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
	pub email: Option<String>,
	pub username: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub program: Option<String>,
	pub enrollment_id: Option<String>,
	pub department: Option<String>,
	pub employee_id: Option<String>,
	pub area: Option<String>,
}

impl UserUpdate {
	/// Applies the update onto `user`, re-validating the role-specific fields
	pub fn apply(self, user: &mut User) -> Result<()> {
		if let Some(email) = self.email {
			user.email = email;
		}
		if let Some(username) = self.username {
			user.username = username;
		}
		if let Some(first_name) = self.first_name {
			user.first_name = first_name;
		}
		if let Some(last_name) = self.last_name {
			user.last_name = last_name;
		}
		if self.program.is_some() {
			user.program = self.program;
		}
		if self.enrollment_id.is_some() {
			user.enrollment_id = self.enrollment_id;
		}
		if self.department.is_some() {
			user.department = self.department;
		}
		if self.employee_id.is_some() {
			user.employee_id = self.employee_id;
		}
		if self.area.is_some() {
			user.area = self.area;
		}
		NewUser::from(&*user).validate()
	}
}

/// Filters for listing users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
	pub role: Option<Role>,
	pub is_active: Option<bool>,
	/// Case-insensitive substring of username, email or name
	pub search: Option<String>,
}
