//! # mysql-pool
//!
//! Bounded idle-connection pool and session facade for MySQL.
//!
//! The pool multiplexes high-level database operations (query, execute,
//! prepared statement, transaction) over physical MySQL connections
//! obtained from a [`Connector`]. It transparently recovers from stale
//! connections and enforces per-connection state invariants:
//!
//! - **Bounded idle cache**: released connections are retained LIFO up to
//!   `max_idle_conns`; checkouts themselves never block and are unbounded.
//! - **Reuse reconciliation**: an idle connection is pinged and restored to
//!   a clean session state (autocommit on, no open transaction) before it
//!   is handed out again.
//! - **Bad-connection retry**: facade operations that hit a dead connection
//!   are retried on a fresh one, up to a fixed per-operation bound.
//! - **Transaction pinning**: a [`Tx`] owns its connection exclusively from
//!   begin until commit or rollback.
//! - **Statement affinity**: a [`Stmt`] caches one server-side prepared
//!   statement per physical connection it has been realized on, and
//!   re-prepares lazily when it lands on a connection it has not seen.
//!
//! The wire protocol itself lives behind the [`Connection`] seam from
//! `mysql-conn`; this crate contains no I/O of its own and no executor.
//! Callers bring their own concurrency.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mysql_pool::{Db, PoolConfig};
//!
//! let db = Db::new(connector, PoolConfig::new().max_idle_conns(8));
//!
//! db.exec("INSERT INTO audit (event) VALUES (?)", &["login".into()])?;
//!
//! let tx = db.begin()?;
//! tx.exec("UPDATE accounts SET balance = balance - 10 WHERE id = ?", &[1.into()])?;
//! tx.exec("UPDATE accounts SET balance = balance + 10 WHERE id = ?", &[2.into()])?;
//! tx.commit()?;
//!
//! let mut stmt = db.prepare("SELECT name FROM users WHERE id = ?")?;
//! let rows = stmt.query(&[42.into()])?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod config;
mod conn;
mod db;
mod pool;
mod stmt;
mod tx;

pub use config::{PoolConfig, DEFAULT_MAX_IDLE_CONNS};
pub use db::Db;
pub use pool::{PoolMetrics, PoolStatus};
pub use stmt::Stmt;
pub use tx::Tx;

// Re-export the capability seam and data model for downstream convenience.
pub use mysql_conn::{ConnectOptions, Connection, Connector, Error, Result};
pub use mysql_types::{Column, ExecResult, ResultSet, Row, Value};
