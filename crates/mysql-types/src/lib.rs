//! # mysql-types
//!
//! Parameter and result data model shared by the MySQL pool facade.
//!
//! Parameters bind at the connection boundary as a tagged [`Value`] variant;
//! results come back as an [`ExecResult`] (for statements that do not return
//! rows) or a [`ResultSet`] of [`Row`]s.
//!
//! ## Example
//!
//! ```rust
//! use mysql_types::Value;
//!
//! let params: Vec<Value> = vec![42i64.into(), "alice".into(), Value::Null];
//! assert_eq!(params[0].as_i64(), Some(42));
//! assert!(params[2].is_null());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod result;
pub mod value;

pub use result::{Column, ExecResult, ResultSet, Row};
pub use value::Value;
