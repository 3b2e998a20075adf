//! # mysql-conn
//!
//! Connection capability seam for the MySQL pool facade.
//!
//! This crate defines what the pool layer consumes (the [`Connection`] and
//! [`Connector`] traits, the [`ConnectOptions`] descriptor, and the shared
//! [`Error`] taxonomy) without implementing any of the wire protocol.
//! A protocol crate provides real implementations; the pool's tests provide
//! recording fakes.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod conn;
pub mod error;
pub mod options;

pub use conn::{Connection, Connector};
pub use error::{Error, Result};
pub use options::ConnectOptions;
