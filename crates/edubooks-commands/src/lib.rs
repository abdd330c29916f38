//! # edubooks-commands
//!
//! Management commands for an EduBooks deployment, run through the
//! `edubooks-manage` binary:
//!
//! ```bash
//! edubooks-manage migrate
//! edubooks-manage process-overdue-loans --dry-run --grace-days 2
//! edubooks-manage expire-reservations
//! edubooks-manage loaddata fixtures/books.json
//! edubooks-manage create-user --role administrator --email root@uni.edu --username root --area Circulation
//! edubooks-manage stats
//! edubooks-manage run-scheduler
//! ```
//!
//! Each command implements [`BaseCommand`] and runs against a
//! [`CommandContext`] holding the settings and an open [`Library`].
//!
//! [`Library`]: edubooks_library::Library

pub mod base;
pub mod builtin;
pub mod cli;
pub mod context;
pub mod error;
pub mod logging;

pub use base::BaseCommand;
pub use builtin::{
	CreateUserCommand, ExpireReservationsCommand, LoadDataCommand, MigrateCommand,
	ProcessOverdueLoansCommand, RunSchedulerCommand, StatsCommand,
};
pub use cli::{Cli, Commands, execute_from_command_line, run};
pub use context::CommandContext;
pub use error::{CommandError, CommandResult};
pub use logging::init_logging;
