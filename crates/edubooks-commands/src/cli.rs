//! CLI runner for EduBooks management commands
//!
//! Parses the command line, loads the layered settings, installs logging and
//! dispatches to the matching [`BaseCommand`].

use crate::builtin::{
	CreateUserCommand, ExpireReservationsCommand, LoadDataCommand, MigrateCommand,
	ProcessOverdueLoansCommand, RunSchedulerCommand, StatsCommand, sweep_options,
};
use crate::{BaseCommand, CommandContext, CommandResult, init_logging};
use clap::{Parser, Subcommand};
use edubooks_conf::Settings;
use edubooks_core::policy::MAX_PERIOD_DAYS;
use edubooks_core::{NewUser, Role};
use std::path::PathBuf;

/// EduBooks management interface
#[derive(Debug, Parser)]
#[command(name = "edubooks-manage")]
#[command(about = "EduBooks management interface", long_about = None)]
#[command(version)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	/// Verbosity level (can be repeated for more output)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbosity: u8,

	/// TOML settings file layered over the defaults
	#[arg(long, value_name = "FILE", env = "EDUBOOKS_SETTINGS", global = true)]
	pub settings: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
	/// Apply database migrations
	Migrate,

	/// Flag overdue loans and issue their fines
	ProcessOverdueLoans {
		/// Compute the fines without saving anything
		#[arg(long)]
		dry_run: bool,

		/// Days tolerated past the due date (defaults to `sweep.grace_days`)
		#[arg(long, value_name = "DAYS", value_parser = days_parser())]
		grace_days: Option<u32>,

		/// Fine per late day (defaults to `loans.daily_fine`)
		#[arg(long, value_name = "AMOUNT", value_parser = clap::value_parser!(i64).range(1..))]
		daily_fine: Option<i64>,

		/// Window for the due-soon listing (defaults to `sweep.upcoming_window_days`)
		#[arg(long, value_name = "DAYS", value_parser = days_parser())]
		upcoming_days: Option<u32>,
	},

	/// Cancel reservations past their expiry
	ExpireReservations,

	/// Load JSON book fixtures into the catalog
	Loaddata {
		/// Fixture files, each an array of books
		#[arg(value_name = "FIXTURE", required = true)]
		files: Vec<PathBuf>,
	},

	/// Create a user account
	CreateUser {
		#[arg(long)]
		role: Role,

		#[arg(long)]
		email: String,

		#[arg(long)]
		username: String,

		#[arg(long, default_value = "")]
		first_name: String,

		#[arg(long, default_value = "")]
		last_name: String,

		/// Study program (students)
		#[arg(long)]
		program: Option<String>,

		/// Enrollment number (students)
		#[arg(long)]
		enrollment_id: Option<String>,

		/// Department (instructors)
		#[arg(long)]
		department: Option<String>,

		/// Employee number (instructors)
		#[arg(long)]
		employee_id: Option<String>,

		/// Area of responsibility (administrators)
		#[arg(long)]
		area: Option<String>,
	},

	/// Show circulation statistics
	Stats {
		/// Print the overview as JSON
		#[arg(long)]
		json: bool,
	},

	/// Run the sweep and maintenance jobs on their schedules
	RunScheduler,
}

fn days_parser() -> clap::builder::RangedI64ValueParser<u32> {
	clap::value_parser!(u32).range(0..=i64::from(MAX_PERIOD_DAYS))
}

impl Commands {
	/// Builds the command, filling unset options from `settings`
	pub fn into_command(self, settings: &Settings) -> Box<dyn BaseCommand> {
		match self {
			Commands::Migrate => Box::new(MigrateCommand),
			Commands::ProcessOverdueLoans {
				dry_run,
				grace_days,
				daily_fine,
				upcoming_days,
			} => {
				let mut options = sweep_options(settings);
				if dry_run {
					options = options.dry_run();
				}
				if let Some(days) = grace_days {
					options = options.with_grace_days(days);
				}
				if let Some(rate) = daily_fine {
					options = options.with_daily_rate(rate);
				}
				if let Some(days) = upcoming_days {
					options = options.with_upcoming_window(days);
				}
				Box::new(ProcessOverdueLoansCommand { options })
			}
			Commands::ExpireReservations => Box::new(ExpireReservationsCommand),
			Commands::Loaddata { files } => Box::new(LoadDataCommand { files }),
			Commands::CreateUser {
				role,
				email,
				username,
				first_name,
				last_name,
				program,
				enrollment_id,
				department,
				employee_id,
				area,
			} => Box::new(CreateUserCommand {
				user: NewUser {
					email,
					username,
					first_name,
					last_name,
					role,
					program,
					enrollment_id,
					department,
					employee_id,
					area,
				},
			}),
			Commands::Stats { json } => Box::new(StatsCommand { json }),
			Commands::RunScheduler => Box::new(RunSchedulerCommand),
		}
	}
}

/// Runs `command` against an already opened context
pub async fn run(command: Commands, ctx: &CommandContext) -> CommandResult<()> {
	let command = command.into_command(ctx.settings());
	tracing::debug!(command = command.name(), "Executing management command");
	command.execute(ctx).await
}

/// Entry point of the `edubooks-manage` binary
pub async fn execute_from_command_line() -> CommandResult<()> {
	let cli = Cli::parse();
	let settings = Settings::load(cli.settings.as_deref())?;
	init_logging(&settings.logging.filter, cli.verbosity)?;

	let ctx = CommandContext::connect(settings)
		.await?
		.with_verbosity(cli.verbosity);
	let result = run(cli.command, &ctx).await;
	ctx.library().database().close().await;
	result
}
