//! `edubooks-manage`: administrative entry point
//!
//! ```bash
//! edubooks-manage --settings edubooks.toml migrate
//! edubooks-manage -v process-overdue-loans --dry-run
//! ```

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	edubooks_commands::execute_from_command_line()
		.await
		.context("edubooks-manage failed")
}
