//! Transaction handle.

use std::sync::Arc;

use parking_lot::Mutex;

use mysql_conn::{Connection, Connector, Error, Result};
use mysql_types::{ExecResult, ResultSet, Value};

use crate::conn::PooledConn;
use crate::db::Db;
use crate::stmt::Stmt;

/// State shared between a transaction and its bound statements.
pub(crate) struct TxShared<C: Connection> {
    /// The pinned connection; not in the idle list while the transaction
    /// is open.
    pub(crate) conn: Arc<PooledConn<C>>,
    /// Monotonic flag, false until commit or rollback.
    done: Mutex<bool>,
}

impl<C: Connection> TxShared<C> {
    pub(crate) fn is_done(&self) -> bool {
        *self.done.lock()
    }
}

/// A transaction pinned to one pooled connection.
///
/// The connection is held exclusively from `begin` until commit or
/// rollback, then returned to the pool. There is no retry inside a
/// transaction: once a bad connection surfaces, the server has already
/// rolled back, so the error is the transaction's outcome.
///
/// Dropping an unfinished transaction rolls it back.
pub struct Tx<'db, C: Connector> {
    db: &'db Db<C>,
    shared: Arc<TxShared<C::Conn>>,
}

impl<'db, C: Connector> Tx<'db, C> {
    pub(crate) fn new(db: &'db Db<C>, conn: Arc<PooledConn<C::Conn>>) -> Self {
        Self {
            db,
            shared: Arc::new(TxShared {
                conn,
                done: Mutex::new(false),
            }),
        }
    }

    /// Whether this transaction has been committed or rolled back.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.shared.is_done()
    }

    /// Execute a statement inside the transaction.
    pub fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        if self.shared.is_done() {
            return Err(Error::TxDone);
        }
        self.shared.conn.exec(sql, args)
    }

    /// Run a query inside the transaction.
    pub fn query(&self, sql: &str, args: &[Value]) -> Result<ResultSet> {
        if self.shared.is_done() {
            return Err(Error::TxDone);
        }
        self.shared.conn.query(sql, args)
    }

    /// Prepare a statement bound to this transaction.
    ///
    /// The returned [`Stmt`] executes on the pinned connection for as long
    /// as the transaction is open; afterwards it falls back to pooled
    /// connections like any other statement.
    pub fn prepare(&self, sql: &str) -> Result<Stmt<'db, C>> {
        if self.shared.is_done() {
            return Err(Error::TxDone);
        }
        let handle = self.shared.conn.prepare(sql)?;
        Ok(Stmt::for_tx(self.db, sql, Arc::clone(&self.shared), handle))
    }

    /// Commit the transaction and return the connection to the pool.
    pub fn commit(&self) -> Result<()> {
        tracing::debug!(conn_id = self.shared.conn.id(), "committing transaction");

        let mut done = self.shared.done.lock();
        if *done {
            return Err(Error::TxDone);
        }
        let result = self.shared.conn.commit();
        self.db
            .pool()
            .release(Arc::clone(&self.shared.conn), result.as_ref().err());
        *done = true;
        result
    }

    /// Roll back the transaction and return the connection to the pool.
    pub fn rollback(&self) -> Result<()> {
        tracing::debug!(conn_id = self.shared.conn.id(), "rolling back transaction");

        let mut done = self.shared.done.lock();
        if *done {
            return Err(Error::TxDone);
        }
        let result = self.shared.conn.rollback();
        self.db
            .pool()
            .release(Arc::clone(&self.shared.conn), result.as_ref().err());
        *done = true;
        result
    }
}

impl<C: Connector> Drop for Tx<'_, C> {
    fn drop(&mut self) {
        let mut done = self.shared.done.lock();
        if *done {
            return;
        }
        *done = true;

        tracing::warn!(
            conn_id = self.shared.conn.id(),
            "transaction dropped without commit or rollback, rolling back"
        );
        let result = self.shared.conn.rollback();
        if let Err(error) = &result {
            tracing::warn!(%error, "rollback on drop failed");
        }
        self.db
            .pool()
            .release(Arc::clone(&self.shared.conn), result.err().as_ref());
    }
}

impl<C: Connector> std::fmt::Debug for Tx<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx")
            .field("conn_id", &self.shared.conn.id())
            .field("done", &self.shared.is_done())
            .finish()
    }
}
