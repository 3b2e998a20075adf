//! Recording fake MySQL backend shared by the integration tests.
//!
//! The fake stands in for the wire-protocol implementation behind the
//! `Connection`/`Connector` seam. It records every backend call in order,
//! lets tests script per-operation failures, exposes per-connection session
//! flags so tests can dirty an idle connection, and can gate `exec` calls
//! on a barrier for concurrency scenarios.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

use mysql_conn::{Connection, Connector, Error, Result};
use mysql_types::{ExecResult, ResultSet, Value};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Operation name: `connect`, `ping`, `exec`, `query`, `prepare`,
    /// `stmt-exec`, `stmt-query`, `stmt-close`, `begin`, `commit`,
    /// `rollback`, `close`.
    pub op: &'static str,
    /// Connection the call ran on (1-based, in connect order).
    pub conn: u64,
    /// SQL text where applicable, empty otherwise.
    pub detail: String,
}

struct SessionFlags {
    in_transaction: Mutex<bool>,
    autocommit: Mutex<bool>,
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self {
            in_transaction: Mutex::new(false),
            autocommit: Mutex::new(true),
        }
    }
}

#[derive(Default)]
struct ServerInner {
    calls: Mutex<Vec<Call>>,
    faults: Mutex<HashMap<&'static str, VecDeque<Error>>>,
    sessions: Mutex<HashMap<u64, Arc<SessionFlags>>>,
    next_conn_id: AtomicU64,
    next_stmt_id: AtomicU64,
    exec_gate: Mutex<Option<Arc<Barrier>>>,
}

impl ServerInner {
    fn record(&self, op: &'static str, conn: u64, detail: impl Into<String>) {
        self.calls.lock().push(Call {
            op,
            conn,
            detail: detail.into(),
        });
    }

    fn take_fault(&self, op: &'static str) -> Result<()> {
        match self.faults.lock().get_mut(op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Handle the test keeps to script and observe the fake backend.
#[derive(Clone)]
pub struct FakeServer {
    inner: Arc<ServerInner>,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ServerInner::default()),
        }
    }

    pub fn connector(&self) -> FakeConnector {
        FakeConnector {
            inner: Arc::clone(&self.inner),
        }
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().clone()
    }

    /// Just the operation names, in order.
    pub fn ops(&self) -> Vec<&'static str> {
        self.inner.calls.lock().iter().map(|c| c.op).collect()
    }

    /// Number of recorded calls of one operation.
    pub fn count(&self, op: &str) -> usize {
        self.inner.calls.lock().iter().filter(|c| c.op == op).count()
    }

    /// Recorded calls of one operation, in order.
    pub fn calls_for(&self, op: &str) -> Vec<Call> {
        self.inner
            .calls
            .lock()
            .iter()
            .filter(|c| c.op == op)
            .cloned()
            .collect()
    }

    /// Script the next call of `op` to fail with `err`. Faults queue up.
    pub fn fail_next(&self, op: &'static str, err: Error) {
        self.inner
            .faults
            .lock()
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Script the next `times` calls of `op` to fail with `err`.
    pub fn fail_times(&self, op: &'static str, err: Error, times: usize) {
        for _ in 0..times {
            self.fail_next(op, err.clone());
        }
    }

    /// Flip a live connection's transaction flag, dirtying its session
    /// behind the pool's back.
    pub fn set_in_transaction(&self, conn: u64, value: bool) {
        if let Some(flags) = self.inner.sessions.lock().get(&conn) {
            *flags.in_transaction.lock() = value;
        }
    }

    /// Flip a live connection's autocommit flag.
    pub fn set_autocommit(&self, conn: u64, value: bool) {
        if let Some(flags) = self.inner.sessions.lock().get(&conn) {
            *flags.autocommit.lock() = value;
        }
    }

    /// Make the next `exec` calls rendezvous: each one blocks until
    /// `participants` of them are in flight at once.
    pub fn gate_execs(&self, participants: usize) {
        *self.inner.exec_gate.lock() = Some(Arc::new(Barrier::new(participants)));
    }
}

pub struct FakeConnector {
    inner: Arc<ServerInner>,
}

impl Connector for FakeConnector {
    type Conn = FakeConn;

    fn connect(&self) -> Result<FakeConn> {
        let id = self.inner.next_conn_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.record("connect", id, "");
        self.inner
            .take_fault("connect")
            .map_err(|err| match err {
                Error::Connect(_) => err,
                other => Error::Connect(other.to_string()),
            })?;

        let flags = Arc::new(SessionFlags::default());
        self.inner.sessions.lock().insert(id, Arc::clone(&flags));

        Ok(FakeConn {
            id,
            inner: Arc::clone(&self.inner),
            flags,
            open: true,
        })
    }
}

/// Server-side prepared statement handle.
#[derive(Debug, Clone)]
pub struct FakeStmt {
    pub id: u64,
    pub sql: String,
}

pub struct FakeConn {
    id: u64,
    inner: Arc<ServerInner>,
    flags: Arc<SessionFlags>,
    open: bool,
}

impl FakeConn {
    fn op(&self, op: &'static str, detail: impl Into<String>) -> Result<()> {
        self.inner.record(op, self.id, detail);
        self.inner.take_fault(op)
    }
}

impl Connection for FakeConn {
    type Stmt = FakeStmt;

    fn ping(&mut self) -> Result<()> {
        self.op("ping", "")
    }

    fn exec(&mut self, sql: &str, _args: &[Value]) -> Result<ExecResult> {
        self.op("exec", sql)?;
        let gate = self.inner.exec_gate.lock().clone();
        if let Some(gate) = gate {
            gate.wait();
        }
        if sql.eq_ignore_ascii_case("SET autocommit = 1") {
            *self.flags.autocommit.lock() = true;
        }
        Ok(ExecResult {
            affected_rows: 1,
            last_insert_id: 0,
            warnings: 0,
        })
    }

    fn query(&mut self, sql: &str, _args: &[Value]) -> Result<ResultSet> {
        self.op("query", sql)?;
        Ok(ResultSet::empty())
    }

    fn prepare(&mut self, sql: &str) -> Result<FakeStmt> {
        self.op("prepare", sql)?;
        let id = self.inner.next_stmt_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(FakeStmt {
            id,
            sql: sql.to_string(),
        })
    }

    fn exec_stmt(&mut self, stmt: &FakeStmt, _args: &[Value]) -> Result<ExecResult> {
        self.op("stmt-exec", stmt.sql.clone())?;
        Ok(ExecResult {
            affected_rows: 1,
            last_insert_id: 0,
            warnings: 0,
        })
    }

    fn query_stmt(&mut self, stmt: &FakeStmt, _args: &[Value]) -> Result<ResultSet> {
        self.op("stmt-query", stmt.sql.clone())?;
        Ok(ResultSet::empty())
    }

    fn close_stmt(&mut self, stmt: &FakeStmt) -> Result<()> {
        self.op("stmt-close", stmt.sql.clone())
    }

    fn begin(&mut self) -> Result<()> {
        self.op("begin", "")?;
        *self.flags.in_transaction.lock() = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.op("commit", "")?;
        *self.flags.in_transaction.lock() = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.op("rollback", "")?;
        *self.flags.in_transaction.lock() = false;
        Ok(())
    }

    fn is_in_transaction(&self) -> bool {
        *self.flags.in_transaction.lock()
    }

    fn is_autocommit(&self) -> bool {
        *self.flags.autocommit.lock()
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.inner.record("close", self.id, "");
    }
}
