use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

pub use sea_orm::{DatabaseConnection as DbPool, DbErr};

pub mod entities;
pub mod models;
pub mod seed;
pub mod store;
pub mod types;

#[derive(Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Connects to `database_url` and brings the schema up to date.
    pub async fn connect(database_url: &str) -> Result<DBService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options.sqlx_logging(false);
        if database_url.contains(":memory:") {
            // Each pooled connection would otherwise open its own empty database.
            options.max_connections(1);
        }

        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        tracing::info!(
            backend = ?pool.get_database_backend(),
            "Database connected"
        );
        Ok(DBService { pool })
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.pool.close().await?;
        tracing::info!("Database connection closed");
        Ok(())
    }
}
