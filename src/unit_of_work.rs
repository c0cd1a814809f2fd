//! Unit of work: one SQLite transaction around a closure.
//!
//! The closure receives the transactional handle and performs every read and
//! write through it. `Ok` commits, `Err` rolls back. Writers take the write
//! lock up front (`BEGIN IMMEDIATE`) so a read-then-write inside the closure
//! cannot be interleaved with another writer.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// How often an aborted unit of work is attempted again.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one. Zero means the caller decides.
    pub max_retries: u32,
    /// Sleep before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 0,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        RetryPolicy::default()
    }

    pub fn retries(max_retries: u32) -> Self {
        RetryPolicy {
            max_retries,
            ..RetryPolicy::default()
        }
    }
}

/// Run `work` inside a transaction, retrying retryable aborts per `policy`.
pub fn run<T, F>(conn: &Connection, policy: &RetryPolicy, label: &str, mut work: F) -> StoreResult<T>
where
    F: FnMut(&Transaction<'_>) -> StoreResult<T>,
{
    let mut attempt: u32 = 0;
    loop {
        match run_once(conn, label, &mut work) {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                warn!(unit = label, attempt, error = %err, "retrying aborted unit of work");
                std::thread::sleep(policy.backoff * attempt);
            }
            Err(err) => return Err(err),
        }
    }
}

fn run_once<T, F>(conn: &Connection, label: &str, work: &mut F) -> StoreResult<T>
where
    F: FnMut(&Transaction<'_>) -> StoreResult<T>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| StoreError::from(e).into_abort())?;

    match work(&tx) {
        Ok(value) => {
            tx.commit().map_err(|e| StoreError::from(e).into_abort())?;
            debug!(unit = label, "committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(unit = label, error = %rollback_err, "rollback failed");
            }
            warn!(unit = label, error = %err, "rolled back");
            Err(err.into_abort())
        }
    }
}
