use sqlx::Postgres;
use sqlx::pool::PoolConnection;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// A pooled connection leased to a single request or scope.
///
/// Dereferences to the driver connection, so it can be used as an executor with
/// `&mut *session`. The lease ends exactly once: either through [`Session::release`]
/// or when the value is dropped, including when the future holding it is cancelled.
pub struct Session<DB: sqlx::Database = Postgres> {
    conn: PoolConnection<DB>,
    leases: Arc<AtomicUsize>,
}

impl<DB: sqlx::Database> Session<DB> {
    pub(crate) fn new(conn: PoolConnection<DB>, leases: Arc<AtomicUsize>) -> Self {
        let leased = leases.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(leased, "Session acquired");
        Self { conn, leases }
    }

    /// Hands the connection back to the pool.
    ///
    /// Consumes the session, so a second release cannot be expressed.
    pub fn release(self) {
        drop(self);
    }
}

impl<DB: sqlx::Database> Drop for Session<DB> {
    fn drop(&mut self) {
        // `conn` is dropped right after this and returns itself to the pool.
        let leased = self.leases.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
        trace!(leased, "Session released");
    }
}

impl<DB: sqlx::Database> Deref for Session<DB> {
    type Target = DB::Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<DB: sqlx::Database> DerefMut for Session<DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl<DB: sqlx::Database> fmt::Debug for Session<DB> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("leased", &self.leases.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
