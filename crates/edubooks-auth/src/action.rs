//! Gated operations and the `authorize` entry point

use crate::permission::{
	Decision, IsActiveUser, IsAdministrator, IsInstructor, IsOwner, Permission, PermissionContext,
};
use edubooks_core::{LibraryError, Result, User, UserId};

/// An operation about to be performed, carrying the owner of the affected record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	/// Create, update or delete catalog books
	ManageCatalog,
	/// Borrow a book on behalf of `borrower`
	CreateLoan { borrower: UserId },
	ReturnLoan,
	RenewLoan { borrower: UserId },
	CreateReservation { holder: UserId },
	CancelReservation { holder: UserId },
	PayFine { debtor: UserId },
	/// Read a loan, reservation or penalty
	ViewRecord { owner: UserId },
	IssuePenalty,
	/// Approve or reject a penalty
	ReviewPenalty,
	RunSweep,
	ViewStatistics,
	ManageUsers,
	/// Edit the profile of `owner`
	EditProfile { owner: UserId },
	CreateReadingList,
	EditReadingList { instructor: UserId },
}

impl Action {
	pub fn name(&self) -> &'static str {
		match self {
			Self::ManageCatalog => "manage_catalog",
			Self::CreateLoan { .. } => "create_loan",
			Self::ReturnLoan => "return_loan",
			Self::RenewLoan { .. } => "renew_loan",
			Self::CreateReservation { .. } => "create_reservation",
			Self::CancelReservation { .. } => "cancel_reservation",
			Self::PayFine { .. } => "pay_fine",
			Self::ViewRecord { .. } => "view_record",
			Self::IssuePenalty => "issue_penalty",
			Self::ReviewPenalty => "review_penalty",
			Self::RunSweep => "run_sweep",
			Self::ViewStatistics => "view_statistics",
			Self::ManageUsers => "manage_users",
			Self::EditProfile { .. } => "edit_profile",
			Self::CreateReadingList => "create_reading_list",
			Self::EditReadingList { .. } => "edit_reading_list",
		}
	}

	/// Owner of the record the action touches, if any
	pub fn owner(&self) -> Option<UserId> {
		match *self {
			Self::CreateLoan { borrower } | Self::RenewLoan { borrower } => Some(borrower),
			Self::CreateReservation { holder } | Self::CancelReservation { holder } => Some(holder),
			Self::PayFine { debtor } => Some(debtor),
			Self::ViewRecord { owner } | Self::EditProfile { owner } => Some(owner),
			Self::EditReadingList { instructor } => Some(instructor),
			_ => None,
		}
	}

	/// Permission a non-administrator must satisfy
	pub fn required(&self) -> Box<dyn Permission> {
		match self {
			Self::CreateLoan { .. }
			| Self::RenewLoan { .. }
			| Self::CreateReservation { .. }
			| Self::CancelReservation { .. }
			| Self::PayFine { .. }
			| Self::ViewRecord { .. }
			| Self::EditProfile { .. } => Box::new(IsOwner),
			Self::CreateReadingList => Box::new(IsInstructor),
			Self::EditReadingList { .. } => Box::new(IsInstructor & IsOwner),
			Self::ManageCatalog
			| Self::ReturnLoan
			| Self::IssuePenalty
			| Self::ReviewPenalty
			| Self::RunSweep
			| Self::ViewStatistics
			| Self::ManageUsers => Box::new(IsAdministrator),
		}
	}

	/// Evaluates the action for `actor`
	///
	/// Inactive accounts are denied everything; administrators pass every
	/// other check.
	pub fn check(&self, actor: &User) -> Decision {
		let mut context = PermissionContext::new(actor);
		if let Some(owner) = self.owner() {
			context = context.with_owner(owner);
		}

		match IsActiveUser.check(&context) {
			Decision::Allow => {}
			denied => return denied,
		}
		if IsAdministrator.has_permission(&context) {
			return Decision::Allow;
		}
		self.required().check(&context)
	}
}

/// Gate called by every service before it touches the store
pub fn authorize(actor: &User, action: Action) -> Result<()> {
	match action.check(actor) {
		Decision::Allow => Ok(()),
		Decision::Deny(reason) => {
			tracing::debug!(
				user_id = %actor.id,
				action = action.name(),
				%reason,
				"Access denied"
			);
			Err(LibraryError::Forbidden(format!("{}: {reason}", action.name())))
		}
	}
}
