//! Connection pool implementation.
//!
//! This module provides a purpose-built idle-connection cache for MySQL
//! with acquire-time health checking and session-state reconciliation
//! (autocommit restored, stray transactions rolled back).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use mysql_conn::{Connection, Connector, Error, Result};

use crate::config::PoolConfig;
use crate::conn::PooledConn;

/// A pool of idle MySQL connections.
///
/// Only the idle cache is bounded: acquisition never blocks and never
/// queues, so under load the pool opens as many connections as concurrent
/// callers demand. Acquire takes the most recently released connection
/// first, probes it with a ping, and reconciles its session state before
/// handing it out; a candidate that fails any of these steps is closed and
/// replaced with a single fresh connect.
pub(crate) struct Pool<C: Connector> {
    connector: C,
    config: PoolConfig,

    /// Idle connections, most recently released at the tail.
    idle: Mutex<Vec<Arc<PooledConn<C::Conn>>>>,

    /// Counter for generating connection IDs.
    next_conn_id: AtomicU64,

    /// Pool metrics.
    metrics: Mutex<PoolMetricsInner>,
}

/// Internal metrics tracking.
#[derive(Debug, Default, Clone)]
struct PoolMetricsInner {
    connections_created: u64,
    connections_closed: u64,
    reuses: u64,
    dirty_reuses: u64,
    evictions: u64,
}

impl<C: Connector> Pool<C> {
    pub(crate) fn new(connector: C, config: PoolConfig) -> Self {
        tracing::info!(
            max_idle = config.max_idle_conns,
            "connection pool created"
        );

        Self {
            connector,
            config,
            idle: Mutex::new(Vec::new()),
            next_conn_id: AtomicU64::new(1),
            metrics: Mutex::new(PoolMetricsInner::default()),
        }
    }

    /// Borrow a connection: most recent idle entry if it proves healthy,
    /// otherwise a single fresh connect.
    ///
    /// At most one idle candidate is inspected per call; a rejected
    /// candidate is closed, not skipped over.
    pub(crate) fn acquire(&self) -> Result<Arc<PooledConn<C::Conn>>> {
        let candidate = self.idle.lock().pop();

        if let Some(conn) = candidate {
            if self.try_reuse(&conn) {
                self.metrics.lock().reuses += 1;
                tracing::trace!(conn_id = conn.id(), "reusing idle connection");
                return Ok(conn);
            }
            if conn.close() {
                self.metrics.lock().connections_closed += 1;
            }
        }

        self.connect_new()
    }

    /// Probe and reconcile an idle candidate under its own mutex.
    fn try_reuse(&self, conn: &Arc<PooledConn<C::Conn>>) -> bool {
        let mut session = conn.session();
        if session.closed {
            return false;
        }
        if session.conn.ping().is_err() {
            return false;
        }

        if session.conn.is_in_transaction() {
            // An idle connection must not carry an open transaction.
            tracing::warn!(
                conn_id = conn.id(),
                "idle connection still in a transaction, rolling back"
            );
            if session.conn.rollback().is_err() {
                return false;
            }
            self.metrics.lock().dirty_reuses += 1;
        } else if !session.conn.is_autocommit() {
            tracing::warn!(
                conn_id = conn.id(),
                "idle connection has autocommit disabled, re-enabling"
            );
            if session.conn.exec("SET autocommit = 1", &[]).is_err() {
                return false;
            }
            self.metrics.lock().dirty_reuses += 1;
        }

        true
    }

    fn connect_new(&self) -> Result<Arc<PooledConn<C::Conn>>> {
        match self.connector.connect() {
            Ok(conn) => {
                let id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
                self.metrics.lock().connections_created += 1;
                tracing::debug!(conn_id = id, "established new connection");
                Ok(Arc::new(PooledConn::new(id, conn)))
            }
            Err(error) => {
                tracing::error!(%error, "failed to establish new connection");
                Err(error)
            }
        }
    }

    /// Return a borrowed connection, passing the outcome of the operation
    /// it was used for. A bad connection is closed; a healthy one is
    /// retained LIFO while the idle cache has room.
    pub(crate) fn release(&self, conn: Arc<PooledConn<C::Conn>>, err: Option<&Error>) {
        if matches!(err, Some(Error::BadConn)) {
            tracing::debug!(conn_id = conn.id(), "discarding bad connection");
            self.metrics.lock().evictions += 1;
            if conn.close() {
                self.metrics.lock().connections_closed += 1;
            }
            return;
        }

        {
            let mut idle = self.idle.lock();
            if idle.len() < self.config.max_idle_conns {
                idle.push(conn);
                return;
            }
        }

        // Idle cache full; closed outside the pool mutex.
        tracing::trace!(conn_id = conn.id(), "idle cache full, closing connection");
        if conn.close() {
            self.metrics.lock().connections_closed += 1;
        }
    }

    pub(crate) fn status(&self) -> PoolStatus {
        PoolStatus {
            idle: self.idle.lock().len(),
            max_idle: self.config.max_idle_conns,
        }
    }

    pub(crate) fn metrics(&self) -> PoolMetrics {
        let inner = self.metrics.lock().clone();
        PoolMetrics {
            connections_created: inner.connections_created,
            connections_closed: inner.connections_closed,
            reuses: inner.reuses,
            dirty_reuses: inner.dirty_reuses,
            evictions: inner.evictions,
        }
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of idle connections available for reuse.
    pub idle: usize,
    /// Idle-connection cap.
    pub max_idle: usize,
}

/// Metrics collected from the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Total connections created since pool start.
    pub connections_created: u64,
    /// Total connections closed since pool start.
    pub connections_closed: u64,
    /// Idle connections successfully reused.
    pub reuses: u64,
    /// Reuses that needed session-state reconciliation.
    pub dirty_reuses: u64,
    /// Connections discarded after a bad-connection error.
    pub evictions: u64,
}

impl PoolMetrics {
    /// Connections still alive: created minus closed.
    #[must_use]
    pub fn connections_alive(&self) -> u64 {
        self.connections_created
            .saturating_sub(self.connections_closed)
    }
}
