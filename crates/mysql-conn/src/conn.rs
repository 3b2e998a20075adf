//! Connection capability traits.
//!
//! The pool facade consumes a MySQL session through the narrow [`Connection`]
//! seam; the wire-protocol implementation (handshake, packet framing, command
//! encoding, result decoding) plugs in behind it. Tests plug in a recording
//! fake instead.

use mysql_types::{ExecResult, ResultSet, Value};

use crate::error::Result;

/// One physical MySQL session.
///
/// A connection is stateful and single-threaded from the client side: the
/// caller is responsible for serializing commands, which the pool does with
/// a per-connection mutex. Any operation may fail with
/// [`Error::BadConn`](crate::Error::BadConn) when the underlying socket is
/// unusable; callers interpret that as "discard this connection".
pub trait Connection: Send {
    /// Server-side prepared statement handle.
    ///
    /// Handles are cheap to clone; commands on a handle are issued through
    /// the connection that prepared it, under the same serialization rules
    /// as every other command.
    type Stmt: Clone + Send;

    /// Probe connection liveness.
    fn ping(&mut self) -> Result<()>;

    /// Execute a statement that does not return rows.
    fn exec(&mut self, sql: &str, args: &[Value]) -> Result<ExecResult>;

    /// Execute a statement and read back its result set.
    fn query(&mut self, sql: &str, args: &[Value]) -> Result<ResultSet>;

    /// Prepare a statement on the server.
    fn prepare(&mut self, sql: &str) -> Result<Self::Stmt>;

    /// Execute a previously prepared statement.
    fn exec_stmt(&mut self, stmt: &Self::Stmt, args: &[Value]) -> Result<ExecResult>;

    /// Query through a previously prepared statement.
    fn query_stmt(&mut self, stmt: &Self::Stmt, args: &[Value]) -> Result<ResultSet>;

    /// Deallocate a previously prepared statement on the server.
    fn close_stmt(&mut self, stmt: &Self::Stmt) -> Result<()>;

    /// Begin a transaction.
    fn begin(&mut self) -> Result<()>;

    /// Commit the open transaction.
    fn commit(&mut self) -> Result<()>;

    /// Roll back the open transaction.
    fn rollback(&mut self) -> Result<()>;

    /// Whether the session currently has an open transaction.
    fn is_in_transaction(&self) -> bool;

    /// Whether the session has autocommit enabled.
    fn is_autocommit(&self) -> bool;

    /// Close the session. Idempotent.
    fn close(&mut self);
}

/// Factory for physical connections.
///
/// A connector carries whatever it needs to reach the server, typically a
/// [`ConnectOptions`](crate::ConnectOptions) descriptor, and hands out
/// fresh sessions on demand.
pub trait Connector: Send + Sync {
    /// The connection type this connector produces.
    type Conn: Connection;

    /// Establish a fresh connection.
    ///
    /// Failures surface as [`Error::Connect`](crate::Error::Connect) and are
    /// propagated to the caller unchanged; they are not retried.
    fn connect(&self) -> Result<Self::Conn>;
}
