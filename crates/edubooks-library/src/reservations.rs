//! Reservation queue

use crate::library::Library;
use edubooks_auth::{Action, authorize};
use edubooks_core::{
	BookId, LibraryError, Reservation, ReservationId, ReservationStatus, Result, User, UserId,
	policy,
};
use edubooks_db::queries::{books, reservations, users};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct Reservations<'a> {
	library: &'a Library,
}

impl<'a> Reservations<'a> {
	pub(crate) fn new(library: &'a Library) -> Self {
		Self { library }
	}

	/// Places a hold on `book_id` for `holder_id`, expiring after the policy hold period
	pub async fn create(
		&self,
		actor: &User,
		book_id: BookId,
		holder_id: UserId,
	) -> Result<Reservation> {
		authorize(actor, Action::CreateReservation { holder: holder_id })?;
		let now = self.library.clock().now();
		let expires_at = policy::instant_after(now, self.library.policy().reservation_days)?;

		let mut tx = self.library.database().begin().await?;
		let book = books::fetch(&mut tx, book_id).await?;
		let holder = users::fetch(&mut tx, holder_id).await?;
		if reservations::find_active(&mut tx, book.id, holder.id)
			.await?
			.is_some()
		{
			return Err(LibraryError::Conflict(format!(
				"user {} already holds an active reservation on book {}",
				holder.id, book.id
			)));
		}
		let reservation = reservations::insert(&mut tx, book.id, holder.id, now, expires_at).await?;
		tx.commit().await?;

		info!(
			reservation_id = %reservation.id,
			book_id = %book.id,
			user_id = %holder.id,
			expires_at = %reservation.expires_at,
			"Reservation created"
		);
		Ok(reservation)
	}

	pub async fn cancel(&self, actor: &User, id: ReservationId) -> Result<Reservation> {
		let mut tx = self.library.database().begin().await?;
		let mut reservation = reservations::fetch(&mut tx, id).await?;
		authorize(
			actor,
			Action::CancelReservation {
				holder: reservation.user_id,
			},
		)?;
		reservation.cancel()?;
		if !reservations::transition_from_active(&mut tx, id, ReservationStatus::Cancelled).await? {
			return Err(LibraryError::InvalidState(format!(
				"reservation {id} is no longer active"
			)));
		}
		tx.commit().await?;

		info!(reservation_id = %id, "Reservation cancelled");
		Ok(reservation)
	}

	pub async fn get(&self, actor: &User, id: ReservationId) -> Result<Reservation> {
		let mut conn = self.library.database().acquire().await?;
		let reservation = reservations::fetch(&mut conn, id).await?;
		authorize(
			actor,
			Action::ViewRecord {
				owner: reservation.user_id,
			},
		)?;
		Ok(reservation)
	}

	/// Every reservation for administrators, the actor's own otherwise
	pub async fn list(
		&self,
		actor: &User,
		status: Option<ReservationStatus>,
	) -> Result<Vec<Reservation>> {
		authorize(actor, Action::ViewRecord { owner: actor.id })?;
		let scope = (!actor.is_admin()).then_some(actor.id);

		let mut conn = self.library.database().acquire().await?;
		reservations::list(&mut conn, scope, status).await
	}

	/// Cancels active reservations whose hold period has ended
	pub async fn expire_stale(&self) -> Result<u64> {
		let now = self.library.clock().now();
		let mut conn = self.library.database().acquire().await?;
		let expired = reservations::expire_stale(&mut conn, now).await?;
		if expired > 0 {
			info!(expired, "Expired stale reservations");
		}
		Ok(expired)
	}
}
