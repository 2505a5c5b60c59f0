use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::{
    bookings::services::{time_order_violation, unknown_owner},
    config::DatabaseConfig,
    error::AppError,
    fields::Value,
    patch::PatchStatement,
};

/// Check constraint enforcing `start_time < end_time` on bookings.
pub const TIME_ORDER_CONSTRAINT: &str = "bookings_time_order";
pub const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";

/// Opens the pool, retrying with a fixed delay, then pings it.
pub async fn connect_with_retry(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = PgPoolOptions::new().max_connections(cfg.max_connections);
    let mut attempt = 0;
    let pool = loop {
        attempt += 1;
        match options.clone().connect(&cfg.url).await {
            Ok(pool) => break pool,
            Err(e) if attempt < cfg.connect_attempts => {
                warn!(error = %e, attempt, max = cfg.connect_attempts, "database connection failed; retrying");
                tokio::time::sleep(cfg.retry_delay()).await;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("connect to database after {attempt} attempts")
                })
            }
        }
    };

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("ping database")?;
    info!(attempt, "database connection established");
    Ok(pool)
}

pub async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    info!("migrations applied");
    Ok(())
}

/// Postgres-backed implementation of the resource stores.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Executes an `UPDATE` built by the patch builder and returns affected rows.
pub(crate) async fn execute_patch(db: &PgPool, stmt: &PatchStatement<'_>) -> Result<u64, AppError> {
    let mut query = sqlx::query(&stmt.sql);
    for value in &stmt.values {
        query = match *value {
            Value::Int(n) => query.bind(n),
            Value::Text(s) => query.bind(s),
            Value::Time(t) => query.bind(t),
        };
    }
    let done = query.execute(db).await.map_err(map_db_error)?;
    Ok(done.rows_affected())
}

/// Translates constraint violations into client errors.
pub(crate) fn map_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let what = match db.constraint() {
                Some(USERNAME_UNIQUE_CONSTRAINT) => "username already taken",
                _ => "duplicate value",
            };
            return AppError::Conflict(what.to_string());
        }
        if db.is_foreign_key_violation() {
            return AppError::Validation(unknown_owner());
        }
        if db.constraint() == Some(TIME_ORDER_CONSTRAINT) {
            return AppError::Validation(time_order_violation());
        }
    }
    AppError::Store(e)
}
