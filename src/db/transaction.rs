/*!
 * Unit-of-work helpers.
 *
 * Every mutating service call runs inside one of these scopes: the closure receives the open
 * transaction, an `Ok` result commits it and any `Err` rolls it back.
 *
 * Lock contention reported by the database (SQLite `BUSY`/`LOCKED`, Postgres deadlock or
 * serialization failure) surfaces as `ServiceError::ConcurrentModification`, so it is retried
 * by [`with_retrying_transaction`] instead of escaping as a 500.
 */

use rand::Rng;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, RuntimeErr,
    TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default attempt budget for operations that may lose an optimistic write race.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// First retry waits roughly this long; each further retry doubles it.
const RETRY_BASE_DELAY_MS: u64 = 10;
const RETRY_MAX_DELAY_MS: u64 = 500;

/// A write that matches no rows. As the first statement of a SQLite transaction it takes the
/// RESERVED lock under the busy handler, the same as `BEGIN IMMEDIATE`.
const SQLITE_WRITE_CLAIM: &str = "UPDATE inventories SET quantity = quantity WHERE 0";

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_DEADLOCK_DETECTED: &str = "40P01";
const PG_LOCK_NOT_AVAILABLE: &str = "55P03";

/// Execute a function within a database transaction
///
/// ```rust,ignore
/// let moved = with_transaction(&db, |txn| {
///     Box::pin(async move {
///         let source = InventoryRepository::find_by_id(txn, id).await?;
///         // ...
///         Ok(source)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<F, T>(db: &DatabaseConnection, f: F) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    let backend = db.get_database_backend();
    let txn = db
        .begin()
        .await
        .map_err(|e| classify_db_error(backend, e))?;

    if backend == DbBackend::Sqlite {
        if let Err(e) = txn.execute_unprepared(SQLITE_WRITE_CLAIM).await {
            rollback(txn).await;
            return Err(classify_db_error(backend, e));
        }
    }

    let result = f(&txn).await;
    match result {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|e| classify_db_error(backend, e))?;
            Ok(value)
        }
        Err(err) => {
            rollback(txn).await;
            Err(match err {
                ServiceError::DatabaseError(e) => classify_db_error(backend, e),
                other => other,
            })
        }
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        warn!(error = %e, "transaction rollback failed");
    }
}

/// Like [`with_transaction`], but re-runs the whole scope from fresh data when it fails with
/// `ConcurrentModification`, up to `max_attempts` times in total, sleeping with jittered
/// exponential backoff between attempts.
pub async fn with_retrying_transaction<F, T>(
    db: &DatabaseConnection,
    max_attempts: u32,
    f: F,
) -> Result<T, ServiceError>
where
    F: for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send + Sync,
    T: Send,
{
    let mut attempt = 1;
    loop {
        match with_transaction(db, &f).await {
            Err(ServiceError::ConcurrentModification(reason)) if attempt < max_attempts => {
                let delay = retry_delay(attempt);
                warn!(
                    attempt,
                    %reason,
                    delay_ms = delay.as_millis() as u64,
                    "unit of work lost a write race, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => {
                if attempt > 1 {
                    debug!(attempt, ok = result.is_ok(), "retried unit of work finished");
                }
                return result;
            }
        }
    }
}

/// Backoff before retry number `attempt` (1-based): `base * 2^(attempt-1)` plus up to the same
/// again in random jitter, capped.
fn retry_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(6);
    let base = (RETRY_BASE_DELAY_MS << exponent).min(RETRY_MAX_DELAY_MS);
    let jitter = rand::thread_rng().gen_range(0..=base);
    Duration::from_millis((base + jitter).min(RETRY_MAX_DELAY_MS))
}

fn classify_db_error(backend: DbBackend, err: DbErr) -> ServiceError {
    if is_lock_contention(backend, &err) {
        ServiceError::ConcurrentModification(format!("database lock contention: {err}"))
    } else {
        ServiceError::DatabaseError(err)
    }
}

/// True when the database refused the statement because another transaction holds a
/// conflicting lock; the whole unit of work can be re-run.
pub fn is_lock_contention(backend: DbBackend, err: &DbErr) -> bool {
    let Some(code) = database_error_code(err) else {
        return false;
    };
    match backend {
        DbBackend::Sqlite => code
            .parse::<i32>()
            .map(|extended| matches!(extended & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false),
        DbBackend::Postgres => matches!(
            code.as_str(),
            PG_SERIALIZATION_FAILURE | PG_DEADLOCK_DETECTED | PG_LOCK_NOT_AVAILABLE
        ),
        _ => false,
    }
}

fn database_error_code(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx_err) => sqlx_err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}
