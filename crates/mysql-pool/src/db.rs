//! Top-level database facade.

use mysql_conn::{Connector, Error, Result};
use mysql_types::{ExecResult, ResultSet, Value};

use crate::config::PoolConfig;
use crate::pool::{Pool, PoolMetrics, PoolStatus};
use crate::stmt::Stmt;
use crate::tx::Tx;

/// Attempt bound for liveness probes.
pub(crate) const MAX_PING_ATTEMPTS: usize = 3;

/// Attempt bound for everything else that can be retried.
pub(crate) const MAX_OP_ATTEMPTS: usize = 10;

/// Decide whether a facade operation should run another attempt.
///
/// Only the bad-connection sentinel is retried: it means the physical
/// connection died, which re-acquiring transparently recovers from. Any
/// other error is a caller concern and short-circuits.
pub(crate) fn should_retry<T>(result: &Result<T>, attempt: usize, max: usize) -> bool {
    if attempt >= max {
        return false;
    }
    if matches!(result, Err(Error::BadConn)) {
        tracing::debug!(attempt, "retrying after bad connection");
        return true;
    }
    false
}

/// Handle to a MySQL database reached through a pool of connections.
///
/// Every operation borrows a connection from the pool, runs under that
/// connection's mutex, and returns the connection when done. Operations
/// that hit a bad connection are transparently retried on a fresh one, up
/// to a fixed per-operation bound; after exhaustion the last bad-connection
/// error is surfaced.
///
/// `Db` is safe to share across threads; callers bring their own
/// concurrency.
///
/// # Example
///
/// ```rust,ignore
/// use mysql_pool::{Db, PoolConfig};
///
/// let db = Db::new(connector, PoolConfig::new().max_idle_conns(8));
/// db.ping()?;
/// let result = db.exec("DELETE FROM sessions WHERE expired = 1", &[])?;
/// println!("expired sessions removed: {}", result.affected_rows);
/// ```
pub struct Db<C: Connector> {
    pool: Pool<C>,
}

impl<C: Connector> Db<C> {
    /// Create a database handle over the given connector.
    #[must_use]
    pub fn new(connector: C, config: PoolConfig) -> Self {
        Self {
            pool: Pool::new(connector, config),
        }
    }

    pub(crate) fn pool(&self) -> &Pool<C> {
        &self.pool
    }

    /// Check connectivity.
    pub fn ping(&self) -> Result<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.ping_once();
            if should_retry(&result, attempt, MAX_PING_ATTEMPTS) {
                continue;
            }
            return result;
        }
    }

    fn ping_once(&self) -> Result<()> {
        let conn = self.pool.acquire()?;
        let result = conn.ping();
        self.pool.release(conn, result.as_ref().err());
        result
    }

    /// Execute a statement that does not return rows.
    pub fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        tracing::debug!(sql = sql, params = args.len(), "executing statement");

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.exec_once(sql, args);
            if should_retry(&result, attempt, MAX_OP_ATTEMPTS) {
                continue;
            }
            return result;
        }
    }

    fn exec_once(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        let conn = self.pool.acquire()?;
        let result = conn.exec(sql, args);
        self.pool.release(conn, result.as_ref().err());
        result
    }

    /// Execute a statement and read back its result set.
    pub fn query(&self, sql: &str, args: &[Value]) -> Result<ResultSet> {
        tracing::debug!(sql = sql, params = args.len(), "executing query");

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.query_once(sql, args);
            if should_retry(&result, attempt, MAX_OP_ATTEMPTS) {
                continue;
            }
            return result;
        }
    }

    fn query_once(&self, sql: &str, args: &[Value]) -> Result<ResultSet> {
        let conn = self.pool.acquire()?;
        let result = conn.query(sql, args);
        self.pool.release(conn, result.as_ref().err());
        result
    }

    /// Prepare a logical statement.
    ///
    /// The returned [`Stmt`] holds no connection: preparing realizes the
    /// statement on one pooled connection and caches the server handle, and
    /// later executions re-acquire (and re-prepare where needed).
    pub fn prepare(&self, sql: &str) -> Result<Stmt<'_, C>> {
        tracing::debug!(sql = sql, "preparing statement");

        let mut stmt = Stmt::new(self, sql);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = stmt.acquire_prepared().map(|(conn, _)| {
                self.pool.release(conn, None);
            });
            if should_retry(&result, attempt, MAX_OP_ATTEMPTS) {
                continue;
            }
            result?;
            return Ok(stmt);
        }
    }

    /// Begin a transaction.
    ///
    /// On success the returned [`Tx`] owns its connection exclusively until
    /// commit or rollback.
    pub fn begin(&self) -> Result<Tx<'_, C>> {
        tracing::debug!("beginning transaction");

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.begin_once();
            if should_retry(&result, attempt, MAX_OP_ATTEMPTS) {
                continue;
            }
            return result;
        }
    }

    fn begin_once(&self) -> Result<Tx<'_, C>> {
        let conn = self.pool.acquire()?;
        match conn.begin() {
            Ok(()) => Ok(Tx::new(self, conn)),
            Err(err) => {
                self.pool.release(conn, Some(&err));
                Err(err)
            }
        }
    }

    /// Get the current pool status.
    #[must_use]
    pub fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Get pool metrics.
    #[must_use]
    pub fn pool_metrics(&self) -> PoolMetrics {
        self.pool.metrics()
    }
}

impl<C: Connector> std::fmt::Debug for Db<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("pool", &self.pool.status())
            .finish()
    }
}
