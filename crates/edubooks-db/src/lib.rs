//! # edubooks-db
//!
//! SQLite persistence for the library.
//!
//! [`Database`] owns the connection pool and the embedded migrations. Queries
//! live in [`queries`], one module per table; every function takes a
//! `&mut SqliteConnection` so callers can run several of them inside one
//! transaction:
//!
//! ```rust,no_run
//! use edubooks_db::{Database, queries::books};
//! use edubooks_core::{BookId, Result};
//!
//! # async fn example(db: &Database) -> Result<()> {
//! let mut tx = db.begin().await?;
//! if books::decrement_available(&mut tx, BookId(1)).await? {
//!     books::sync_status(&mut tx, BookId(1)).await?;
//! }
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod queries;

pub use database::Database;

pub use sqlx::{Sqlite, SqliteConnection, Transaction};

/// Transaction type used by the services
pub type Tx<'c> = Transaction<'c, Sqlite>;
