//! Vehicle persistence.
//!
//! The [`VehicleStore`] and [`ChangeFeed`] traits are the seam between the
//! HTTP layer, the change notifier and the storage engine. Two backends
//! implement them: PostgreSQL ([`PgVehicleStore`], [`PgChangeFeed`]) and an
//! in-process store ([`MemoryVehicleStore`]) used by tests.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod feed;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use feed::{PgChangeFeed, CHANGE_CHANNEL};
pub use memory::MemoryVehicleStore;
pub use repositories::PgVehicleStore;
pub use store::{ChangeFeed, ChangeStream, VehicleStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
