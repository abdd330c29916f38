//! Management commands.

pub use edubooks_commands::*;
