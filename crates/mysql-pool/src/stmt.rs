//! Logical prepared statements.
//!
//! A [`Stmt`] is a logical handle over SQL text. Realizing it on a physical
//! connection produces a server-side prepared statement; the handle caches
//! one realization per connection it has ever touched, keyed by connection
//! identity, so re-executing on a pooled connection skips the server-side
//! prepare. Statements prepared inside a transaction are pinned to the
//! transaction's connection until it finishes.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use mysql_conn::{Connection, Connector, Result};
use mysql_types::{ExecResult, ResultSet, Value};

use crate::conn::PooledConn;
use crate::db::{should_retry, Db, MAX_OP_ATTEMPTS};
use crate::tx::TxShared;

type StmtHandle<C> = <<C as Connector>::Conn as Connection>::Stmt;

/// One realization of the statement on one physical connection.
///
/// The connection reference is weak: a statement never extends a
/// connection's lifetime, and an entry whose connection is gone is simply
/// a stale cache slot that future lookups miss.
struct CachedStmt<C: Connection> {
    conn: Weak<PooledConn<C>>,
    handle: C::Stmt,
}

struct TxBinding<C: Connection> {
    tx: Arc<TxShared<C>>,
    handle: C::Stmt,
}

/// A logical prepared statement.
///
/// In pool mode each execution borrows a connection, reuses the cached
/// server statement for that connection (preparing and caching on a miss),
/// and returns the connection afterwards; bad connections are retried like
/// any other facade operation. The cache only grows: a long-lived statement
/// accumulates one entry per connection it ever executed on, and entries
/// are dropped only by [`Stmt::close`].
///
/// A statement created by [`Tx::prepare`](crate::Tx::prepare) executes on
/// its transaction's pinned connection instead; once that transaction is
/// done, the statement transparently falls back to pool mode.
pub struct Stmt<'db, C: Connector> {
    db: &'db Db<C>,
    sql: String,
    cached: HashMap<u64, CachedStmt<C::Conn>>,
    tx: Option<TxBinding<C::Conn>>,
}

impl<'db, C: Connector> Stmt<'db, C> {
    pub(crate) fn new(db: &'db Db<C>, sql: &str) -> Self {
        Self {
            db,
            sql: sql.to_string(),
            cached: HashMap::new(),
            tx: None,
        }
    }

    pub(crate) fn for_tx(
        db: &'db Db<C>,
        sql: &str,
        tx: Arc<TxShared<C::Conn>>,
        handle: StmtHandle<C>,
    ) -> Self {
        let mut stmt = Self::new(db, sql);
        stmt.tx = Some(TxBinding { tx, handle });
        stmt
    }

    /// The SQL text this statement was prepared from.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Execute the statement.
    pub fn exec(&mut self, args: &[Value]) -> Result<ExecResult> {
        if let Some(binding) = &self.tx {
            if !binding.tx.is_done() {
                return binding.tx.conn.exec_stmt(&binding.handle, args);
            }
        }
        self.unbind_finished_tx();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.pool_exec(args);
            if should_retry(&result, attempt, MAX_OP_ATTEMPTS) {
                continue;
            }
            return result;
        }
    }

    /// Run the statement as a query.
    pub fn query(&mut self, args: &[Value]) -> Result<ResultSet> {
        if let Some(binding) = &self.tx {
            if !binding.tx.is_done() {
                return binding.tx.conn.query_stmt(&binding.handle, args);
            }
        }
        self.unbind_finished_tx();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.pool_query(args);
            if should_retry(&result, attempt, MAX_OP_ATTEMPTS) {
                continue;
            }
            return result;
        }
    }

    /// Borrow a connection with this statement realized on it.
    ///
    /// The connection is on loan: the caller must release it, whatever the
    /// outcome of the execution it performs. On a prepare failure the
    /// connection is released here, with the error, before it propagates.
    pub(crate) fn acquire_prepared(
        &mut self,
    ) -> Result<(Arc<PooledConn<C::Conn>>, StmtHandle<C>)> {
        let conn = self.db.pool().acquire()?;

        if let Some(cached) = self.cached.get(&conn.id()) {
            return Ok((conn, cached.handle.clone()));
        }

        match conn.prepare(&self.sql) {
            Ok(handle) => {
                self.cached.insert(
                    conn.id(),
                    CachedStmt {
                        conn: Arc::downgrade(&conn),
                        handle: handle.clone(),
                    },
                );
                Ok((conn, handle))
            }
            Err(err) => {
                self.db.pool().release(conn, Some(&err));
                Err(err)
            }
        }
    }

    fn pool_exec(&mut self, args: &[Value]) -> Result<ExecResult> {
        let (conn, handle) = self.acquire_prepared()?;
        let result = conn.exec_stmt(&handle, args);
        self.db.pool().release(conn, result.as_ref().err());
        result
    }

    fn pool_query(&mut self, args: &[Value]) -> Result<ResultSet> {
        let (conn, handle) = self.acquire_prepared()?;
        let result = conn.query_stmt(&handle, args);
        self.db.pool().release(conn, result.as_ref().err());
        result
    }

    /// Drop the transaction binding after its transaction finished, closing
    /// the pinned server statement. The statement keeps working through the
    /// pool afterwards.
    fn unbind_finished_tx(&mut self) {
        if self.tx.is_none() {
            return;
        }
        if let Err(error) = self.close_tx_binding() {
            tracing::debug!(%error, "closing transaction-bound statement failed");
        }
    }

    fn close_tx_binding(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(binding) => binding.tx.conn.close_stmt(&binding.handle),
            None => Ok(()),
        }
    }

    /// Close the statement, deallocating every server-side realization on
    /// connections that are still open.
    ///
    /// Returns the last error observed. Idempotent: a second close finds
    /// nothing left to deallocate.
    pub fn close(&mut self) -> Result<()> {
        if self.tx.is_some() {
            return self.close_tx_binding();
        }

        let mut last: Result<()> = Ok(());
        for (_, cached) in self.cached.drain() {
            let Some(conn) = cached.conn.upgrade() else {
                continue;
            };
            if let Err(err) = conn.close_stmt(&cached.handle) {
                last = Err(err);
            }
        }
        last
    }
}

impl<C: Connector> Drop for Stmt<'_, C> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::debug!(%error, "closing statement on drop failed");
        }
    }
}

impl<C: Connector> std::fmt::Debug for Stmt<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stmt")
            .field("sql", &self.sql)
            .field("realized_on", &self.cached.len())
            .field("tx_bound", &self.tx.is_some())
            .finish()
    }
}
