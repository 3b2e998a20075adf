//! Pooled connection wrapper.

use parking_lot::{Mutex, MutexGuard};

use mysql_conn::{Connection, Error, Result};
use mysql_types::{ExecResult, ResultSet, Value};

/// One physical connection plus local bookkeeping.
///
/// Owned by the pool while idle, on loan to exactly one borrower (a facade
/// operation, a transaction, or a statement prepare) while in use. All
/// command traffic and the `closed` flag are serialized by one mutex, held
/// across the full duration of each command, I/O included.
pub(crate) struct PooledConn<C: Connection> {
    id: u64,
    session: Mutex<Session<C>>,
}

pub(crate) struct Session<C: Connection> {
    pub(crate) conn: C,
    pub(crate) closed: bool,
}

impl<C: Connection> PooledConn<C> {
    pub(crate) fn new(id: u64, conn: C) -> Self {
        Self {
            id,
            session: Mutex::new(Session { conn, closed: false }),
        }
    }

    /// Stable identity for statement-cache keys. Never reused by the pool.
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn session(&self) -> MutexGuard<'_, Session<C>> {
        self.session.lock()
    }

    /// Run one command under the connection mutex, gated on `closed`.
    fn run<T>(&self, op: impl FnOnce(&mut C) -> Result<T>) -> Result<T> {
        let mut session = self.session.lock();
        if session.closed {
            return Err(Error::BadConn);
        }
        op(&mut session.conn)
    }

    pub(crate) fn ping(&self) -> Result<()> {
        self.run(|conn| conn.ping())
    }

    pub(crate) fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        self.run(|conn| conn.exec(sql, args))
    }

    pub(crate) fn query(&self, sql: &str, args: &[Value]) -> Result<ResultSet> {
        self.run(|conn| conn.query(sql, args))
    }

    pub(crate) fn prepare(&self, sql: &str) -> Result<C::Stmt> {
        self.run(|conn| conn.prepare(sql))
    }

    pub(crate) fn exec_stmt(&self, stmt: &C::Stmt, args: &[Value]) -> Result<ExecResult> {
        self.run(|conn| conn.exec_stmt(stmt, args))
    }

    pub(crate) fn query_stmt(&self, stmt: &C::Stmt, args: &[Value]) -> Result<ResultSet> {
        self.run(|conn| conn.query_stmt(stmt, args))
    }

    /// Deallocate a server statement, unless the connection is already
    /// closed: a dead session takes its statements with it.
    pub(crate) fn close_stmt(&self, stmt: &C::Stmt) -> Result<()> {
        let mut session = self.session.lock();
        if session.closed {
            return Ok(());
        }
        session.conn.close_stmt(stmt)
    }

    pub(crate) fn begin(&self) -> Result<()> {
        self.run(|conn| conn.begin())
    }

    pub(crate) fn commit(&self) -> Result<()> {
        self.run(|conn| conn.commit())
    }

    pub(crate) fn rollback(&self) -> Result<()> {
        self.run(|conn| conn.rollback())
    }

    /// Close the underlying connection. Idempotent; returns whether this
    /// call performed the close.
    pub(crate) fn close(&self) -> bool {
        let mut session = self.session.lock();
        session.close()
    }
}

impl<C: Connection> Session<C> {
    /// Close under an already-held session guard.
    pub(crate) fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.conn.close();
        true
    }
}

impl<C: Connection> Drop for PooledConn<C> {
    fn drop(&mut self) {
        self.session.get_mut().close();
    }
}

impl<C: Connection> std::fmt::Debug for PooledConn<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConn").field("id", &self.id).finish()
    }
}
