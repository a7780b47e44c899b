use crate::config::Config;
use crate::errors::AppError;
use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Schema for the customer table, applied on every fresh connection.
pub const SCHEMA: &str = include_str!("../migrations/0001_create_customers.sql");

type ConnectAttempt<T> = Shared<BoxFuture<'static, Result<T, Arc<sqlx::Error>>>>;
type Connector<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, sqlx::Error>> + Send + Sync>;

/// A process-wide handle that is established on first use and then memoized.
///
/// At most one connect attempt is outstanding at any time: callers arriving
/// while it is in flight await the same attempt and observe the same outcome.
/// A successful handle is kept for the rest of the process lifetime. A failed
/// attempt is discarded so the next call starts over.
pub struct LazyConnection<T>
where
    T: Clone + Send + Sync + 'static,
{
    connector: Connector<T>,
    slot: Mutex<Option<ConnectAttempt<T>>>,
}

impl<T> LazyConnection<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(connector: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, sqlx::Error>> + Send + 'static,
    {
        Self {
            connector: Box::new(move || connector().boxed()),
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached handle, connecting first if nothing is cached yet.
    pub async fn acquire(&self) -> Result<T, AppError> {
        let attempt = {
            let mut slot = self.lock_slot();
            match slot.as_ref() {
                Some(in_flight) => in_flight.clone(),
                None => {
                    tracing::debug!("No cached connection, starting connect attempt");
                    let attempt = (self.connector)()
                        .map(|result| result.map_err(Arc::new))
                        .boxed()
                        .shared();
                    *slot = Some(attempt.clone());
                    attempt
                }
            }
        };

        match attempt.clone().await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                let mut slot = self.lock_slot();
                // A newer attempt may already be installed; only drop our own
                if slot.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
                    *slot = None;
                    tracing::warn!("Connect attempt failed, will retry on next call: {}", e);
                }
                Err(AppError::ConnectionError(e))
            }
        }
    }

    /// True once a connect attempt has completed successfully.
    pub fn is_connected(&self) -> bool {
        self.lock_slot()
            .as_ref()
            .and_then(|attempt| attempt.peek())
            .is_some_and(|result| result.is_ok())
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<ConnectAttempt<T>>> {
        // The slot is only ever swapped whole, so a poisoned guard is still consistent
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lazily-connected PostgreSQL pool shared by every request.
pub struct Database {
    connection: LazyConnection<PgPool>,
}

impl Database {
    /// Prepares the connection manager. No I/O happens until the first `pool()` call.
    pub fn new(config: &Config) -> Self {
        let database_url = config.database_url.clone();
        let max_connections = config.db_max_connections;
        let acquire_timeout = Duration::from_secs(config.db_acquire_timeout_secs);

        let connection = LazyConnection::new(move || {
            let database_url = database_url.clone();
            async move {
                let pool = PgPoolOptions::new()
                    .max_connections(max_connections)
                    .acquire_timeout(acquire_timeout)
                    .connect(&database_url)
                    .await?;

                sqlx::raw_sql(SCHEMA).execute(&pool).await?;
                tracing::info!("Database connection pool established");

                Ok(pool)
            }
        });

        Self { connection }
    }

    pub async fn pool(&self) -> Result<PgPool, AppError> {
        self.connection.acquire().await
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }
}
