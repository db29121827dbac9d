pub mod builder;
pub mod condition;
pub mod connection;
pub mod error;
pub mod row;
pub mod sql;
pub mod tracing;
pub mod value;

// Re-export key types and traits
pub use builder::{Bound, Direction, Projection, QueryBuilder};
pub use condition::{Clause, Condition, IntoCondition, Joiner, Nested, Operator, Raw, nested, raw};
pub use connection::Connection;
pub use error::{QuarryError, Result};
pub use row::Row;
pub use sql::{SQL, quote_ident};
pub use value::Value;
