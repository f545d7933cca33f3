//! `PostgreSQL` reservation repository for Bookings.
//!
//! This crate implements the [`DatabaseRepo`] contract from `bookings-core`
//! on top of an sqlx connection pool:
//!
//! - every insert runs in its own transaction
//! - every insert is bounded by a timeout (three seconds by default); when
//!   it elapses the transaction is dropped and rolled back
//! - a reservation for a room that does not exist is reported as
//!   [`PersistenceError::UnknownRoom`] (foreign-key violation)
//!
//! The schema ships as sqlx migrations in `migrations/`.
//!
//! # Example
//!
//! ```ignore
//! use bookings_postgres::PostgresRepo;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = PostgresRepo::connect("postgres://localhost/bookings").await?;
//!     repo.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use bookings_core::model::{Reservation, ReservationId};
use bookings_core::repository::{DEFAULT_INSERT_TIMEOUT, DatabaseRepo, PersistenceError};
use sqlx::PgPool;
use sqlx::migrate::MigrateError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while setting up the repository.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The database could not be reached.
    #[error("Failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] MigrateError),
}

/// `PostgreSQL`-backed [`DatabaseRepo`].
#[derive(Clone, Debug)]
pub struct PostgresRepo {
    pool: PgPool,
    insert_timeout: Duration,
}

impl PostgresRepo {
    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Connect`] if the database cannot be reached.
    pub async fn connect(database_url: &str) -> Result<Self, SetupError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    ///
    /// Use this to share a pool or to configure it with `PgPoolOptions`.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            insert_timeout: DEFAULT_INSERT_TIMEOUT,
        }
    }

    /// Bound each insert by `timeout`.
    #[must_use]
    pub const fn with_insert_timeout(mut self, timeout: Duration) -> Self {
        self.insert_timeout = timeout;
        self
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Migrate`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), SetupError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    async fn insert(&self, reservation: &Reservation) -> Result<ReservationId, PersistenceError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO reservations (
                first_name, last_name, email, phone,
                start_date, end_date, room_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
            RETURNING id
            ",
        )
        .bind(&reservation.first_name)
        .bind(&reservation.last_name)
        .bind(&reservation.email)
        .bind(&reservation.phone)
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(reservation.room_id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return PersistenceError::UnknownRoom(reservation.room_id);
                }
            }
            database_error(e)
        })?;

        tx.commit().await.map_err(database_error)?;
        Ok(ReservationId::new(id))
    }
}

impl DatabaseRepo for PostgresRepo {
    fn ping(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            match sqlx::query("SELECT 1").execute(&self.pool).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Database ping failed");
                    false
                }
            }
        })
    }

    fn insert_reservation<'a>(
        &'a self,
        reservation: &'a Reservation,
    ) -> Pin<Box<dyn Future<Output = Result<ReservationId, PersistenceError>> + Send + 'a>> {
        Box::pin(async move {
            let started = std::time::Instant::now();

            let result = tokio::time::timeout(self.insert_timeout, self.insert(reservation))
                .await
                .unwrap_or(Err(PersistenceError::Timeout(self.insert_timeout)));

            metrics::histogram!("reservations_insert_duration_seconds")
                .record(started.elapsed().as_secs_f64());

            match &result {
                Ok(id) => {
                    tracing::debug!(reservation_id = %id, room_id = %reservation.room_id, "Reservation inserted");
                }
                Err(e) => {
                    metrics::counter!("reservations_insert_errors_total", "kind" => error_kind(e))
                        .increment(1);
                    tracing::warn!(error = %e, room_id = %reservation.room_id, "Reservation insert failed");
                }
            }

            result
        })
    }
}

fn database_error(e: sqlx::Error) -> PersistenceError {
    PersistenceError::Database(e.to_string())
}

const fn error_kind(e: &PersistenceError) -> &'static str {
    match e {
        PersistenceError::Timeout(_) => "timeout",
        PersistenceError::UnknownRoom(_) => "unknown_room",
        PersistenceError::Database(_) => "database",
    }
}
