//! Connection pool and migrations

use edubooks_core::{LibraryError, Result};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Handle on the library database
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
	pool: SqlitePool,
}

impl Database {
	/// Opens (creating if missing) the database at `url` with foreign keys enforced
	pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(url)?
			.create_if_missing(true)
			.foreign_keys(true);
		let pool = SqlitePoolOptions::new()
			.max_connections(max_connections.max(1))
			.connect_with(options)
			.await?;
		tracing::info!(url, max_connections, "Connected to database");
		Ok(Self { pool })
	}

	/// Private in-memory database, already migrated
	///
	/// Uses a single connection that never expires, since every new
	/// connection to `sqlite::memory:` would see an empty database.
	pub async fn in_memory() -> Result<Self> {
		let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.min_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?;
		let db = Self { pool };
		db.migrate().await?;
		Ok(db)
	}

	/// Applies pending migrations
	pub async fn migrate(&self) -> Result<()> {
		MIGRATOR
			.run(&self.pool)
			.await
			.map_err(|e| LibraryError::Database(sqlx::Error::Migrate(Box::new(e))))?;
		tracing::debug!("Migrations applied");
		Ok(())
	}

	/// Migrations embedded in the binary, as `(version, description)`
	pub fn migrations() -> Vec<(i64, String)> {
		MIGRATOR
			.iter()
			.map(|m| (m.version, m.description.to_string()))
			.collect()
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
		Ok(self.pool.begin().await?)
	}

	pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
		Ok(self.pool.acquire().await?)
	}

	pub async fn close(&self) {
		self.pool.close().await;
	}
}
