//! SQLite store and query modules.
//!
//! ```rust,no_run
//! use edubooks::db::Database;
//!
//! # async fn example() -> edubooks::Result<()> {
//! let db = Database::in_memory().await?;
//! # Ok(())
//! # }
//! ```

pub use edubooks_db::*;
