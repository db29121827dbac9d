//! SQLite driver for quarry
//!
//! This crate provides a [`quarry_core::Connection`] backed by
//! [`rusqlite`], plus the SQLite transaction behaviours it can open.
//!
//! ```
//! use quarry_core::{Connection, Value};
//! use quarry_sqlite::SQLiteConnection;
//!
//! let conn = SQLiteConnection::open_in_memory().unwrap();
//! conn.execute_batch("create table foo (id integer primary key, name text)").unwrap();
//! conn.execute("insert into foo (name) values (?)", &[Value::from("Joe")]).unwrap();
//!
//! let rows = conn.query("select * from foo", &[]).unwrap();
//! assert_eq!(rows[0].get("name"), Some(&Value::from("Joe")));
//! ```

pub mod connection;

pub use connection::{SQLiteConnection, SQLiteTransactionType};
