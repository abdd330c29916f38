//! Built-in commands

use crate::{BaseCommand, CommandContext, CommandError, CommandResult};
use async_trait::async_trait;
use edubooks_conf::Settings;
use edubooks_core::{NewBook, NewUser};
use edubooks_db::Database;
use edubooks_library::SweepOptions;
use edubooks_tasks::maintenance_scheduler;
use std::path::PathBuf;

/// Sweep options configured in `[sweep]`
pub fn sweep_options(settings: &Settings) -> SweepOptions {
	SweepOptions::default()
		.with_grace_days(settings.sweep.grace_days)
		.with_upcoming_window(settings.sweep.upcoming_window_days)
}

/// Applies pending database migrations
pub struct MigrateCommand;

#[async_trait]
impl BaseCommand for MigrateCommand {
	fn name(&self) -> &str {
		"migrate"
	}

	fn description(&self) -> &str {
		"Apply database migrations"
	}

	async fn execute(&self, ctx: &CommandContext) -> CommandResult<()> {
		ctx.info("Running migrations...");
		for (version, description) in Database::migrations() {
			ctx.verbose(&format!("  {version} {description}"));
		}
		ctx.library().database().migrate().await?;
		ctx.success("Database is up to date");
		Ok(())
	}
}

/// Runs the overdue sweep once
pub struct ProcessOverdueLoansCommand {
	pub options: SweepOptions,
}

#[async_trait]
impl BaseCommand for ProcessOverdueLoansCommand {
	fn name(&self) -> &str {
		"process-overdue-loans"
	}

	fn description(&self) -> &str {
		"Flag overdue loans and issue their fines"
	}

	async fn execute(&self, ctx: &CommandContext) -> CommandResult<()> {
		if self.options.dry_run {
			ctx.warning("Dry run: no changes will be saved");
		}
		let report = ctx.library().sweep().execute(self.options).await?;

		ctx.info(&format!(
			"Found {} overdue loan(s) due before {}",
			report.found, report.cutoff
		));
		for entry in &report.processed {
			ctx.verbose(&format!(
				"  loan {} (user {}): {} day(s) late, fine {}",
				entry.loan_id, entry.user_id, entry.days_late, entry.amount
			));
		}
		for entry in &report.skipped {
			ctx.verbose(&format!(
				"  loan {} already has a penalty, skipped",
				entry.loan_id
			));
		}
		for failure in &report.failures {
			ctx.warning(&format!("loan {}: {}", failure.loan_id, failure.error));
		}
		if !report.upcoming.is_empty() {
			ctx.info(&format!(
				"{} loan(s) due within {} day(s)",
				report.upcoming.len(),
				self.options.upcoming_window_days
			));
			for loan in &report.upcoming {
				ctx.verbose(&format!("  loan {} due {}", loan.id, loan.due_date));
			}
		}

		let verb = if report.dry_run { "Would fine" } else { "Fined" };
		ctx.success(&format!(
			"{verb} {} loan(s) for a total of {} ({} skipped, {} failed)",
			report.processed.len(),
			report.total_amount(),
			report.skipped.len(),
			report.failures.len()
		));
		Ok(())
	}
}

/// Cancels reservations past their expiry
pub struct ExpireReservationsCommand;

#[async_trait]
impl BaseCommand for ExpireReservationsCommand {
	fn name(&self) -> &str {
		"expire-reservations"
	}

	fn description(&self) -> &str {
		"Cancel expired reservations"
	}

	async fn execute(&self, ctx: &CommandContext) -> CommandResult<()> {
		let expired = ctx.library().reservations().expire_stale().await?;
		ctx.success(&format!("Expired {expired} reservation(s)"));
		Ok(())
	}
}

/// Loads JSON book fixtures into the catalog
///
/// Each file holds an array of books. All files are loaded in one
/// transaction; books whose ISBN is already catalogued are kept as they are.
pub struct LoadDataCommand {
	pub files: Vec<PathBuf>,
}

impl LoadDataCommand {
	async fn read_entries(&self) -> CommandResult<Vec<NewBook>> {
		let mut entries = Vec::new();
		for path in &self.files {
			let raw = tokio::fs::read_to_string(path)
				.await
				.map_err(|source| CommandError::Fixture {
					path: path.clone(),
					source,
				})?;
			let books: Vec<NewBook> =
				serde_json::from_str(&raw).map_err(|source| CommandError::MalformedFixture {
					path: path.clone(),
					source,
				})?;
			tracing::debug!(path = %path.display(), books = books.len(), "Fixture parsed");
			entries.extend(books);
		}
		Ok(entries)
	}
}

#[async_trait]
impl BaseCommand for LoadDataCommand {
	fn name(&self) -> &str {
		"loaddata"
	}

	fn description(&self) -> &str {
		"Load book fixtures into the catalog"
	}

	async fn execute(&self, ctx: &CommandContext) -> CommandResult<()> {
		if self.files.is_empty() {
			return Err(CommandError::InvalidArguments(
				"at least one fixture file is required".to_string(),
			));
		}
		let entries = self.read_entries().await?;
		let outcome = ctx.library().catalog().load(entries).await?;

		for book in &outcome.created {
			ctx.verbose(&format!("  created: {} - {}", book.title, book.author));
		}
		for book in &outcome.existing {
			ctx.verbose(&format!("  already catalogued: {} - {}", book.title, book.author));
		}
		ctx.success(&format!(
			"Installed {} book(s), {} already present",
			outcome.created.len(),
			outcome.existing.len()
		));
		Ok(())
	}
}

/// Creates an account of any role
pub struct CreateUserCommand {
	pub user: NewUser,
}

#[async_trait]
impl BaseCommand for CreateUserCommand {
	fn name(&self) -> &str {
		"create-user"
	}

	fn description(&self) -> &str {
		"Create a user account"
	}

	async fn execute(&self, ctx: &CommandContext) -> CommandResult<()> {
		let user = ctx.library().users().provision(self.user.clone()).await?;
		ctx.success(&format!(
			"Created {} '{}' with id {}",
			user.role.as_str(),
			user.username,
			user.id
		));
		Ok(())
	}
}

/// Prints the circulation overview
pub struct StatsCommand {
	pub json: bool,
}

#[async_trait]
impl BaseCommand for StatsCommand {
	fn name(&self) -> &str {
		"stats"
	}

	fn description(&self) -> &str {
		"Show circulation statistics"
	}

	async fn execute(&self, ctx: &CommandContext) -> CommandResult<()> {
		let overview = ctx.library().statistics().collect().await?;
		if self.json {
			println!("{}", serde_json::to_string_pretty(&overview)?);
			return Ok(());
		}

		let catalog = &overview.catalog;
		ctx.info(&format!(
			"Books: {} title(s) ({} available), {} cop(ies), {} on the shelf",
			catalog.titles, catalog.available_titles, catalog.copies, catalog.available_copies
		));
		ctx.info(&format!(
			"Loans: {} total, {} active, {} overdue, {} returned ({} past due, not yet swept)",
			overview.loans.total,
			overview.loans.active,
			overview.loans.overdue,
			overview.loans.returned,
			overview.late_loans
		));
		ctx.info(&format!(
			"Reservations: {} active; penalties: {} active",
			overview.active_reservations, overview.active_penalties
		));
		for entry in &overview.most_loaned {
			ctx.info(&format!("  {} ({} loan(s))", entry.book.title, entry.loan_count));
		}
		Ok(())
	}
}

/// Runs the sweep and maintenance jobs on their cron schedules until interrupted
pub struct RunSchedulerCommand;

#[async_trait]
impl BaseCommand for RunSchedulerCommand {
	fn name(&self) -> &str {
		"run-scheduler"
	}

	fn description(&self) -> &str {
		"Run scheduled maintenance until Ctrl-C"
	}

	async fn execute(&self, ctx: &CommandContext) -> CommandResult<()> {
		let settings = ctx.settings();
		let scheduler = maintenance_scheduler(
			ctx.library().clone(),
			&settings.sweep.schedule,
			&settings.sweep.maintenance_schedule,
			sweep_options(settings),
		)?;
		ctx.info(&format!(
			"Scheduler running {} task(s); press Ctrl-C to stop",
			scheduler.len()
		));

		tokio::select! {
			_ = scheduler.run() => {}
			signal = tokio::signal::ctrl_c() => {
				signal.map_err(|e| {
					CommandError::ExecutionError(format!("cannot listen for Ctrl-C: {e}"))
				})?;
				scheduler.shutdown();
				ctx.info("Scheduler stopped");
			}
		}
		Ok(())
	}
}
