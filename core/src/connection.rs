use crate::error::Result;
use crate::{Row, Value};

/// Connection trait to abstract database connections.
///
/// This is the whole surface quarry needs from a driver: statement execution,
/// row queries, the generated key of the last insert and explicit transaction
/// control. Drivers (see `quarry-sqlite`) and test doubles implement it.
pub trait Connection {
    /// Execute a SQL statement with parameters and return affected rows
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Execute a SQL query with parameters and return rows, keyed by column name
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Single value of the first row, or `None` for an empty result.
    ///
    /// Rows are keyed by name, so the default is only meaningful for
    /// single-column queries; drivers override it with positional access.
    fn scalar(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        let rows = self.query(sql, params)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next().map(|(_, value)| value)))
    }

    /// Key generated by the most recent successful INSERT
    fn last_insert_id(&self) -> Result<Value>;

    /// Whether inserting `NULL` into `column` of `table` makes the database
    /// assign the value reported by [`Connection::last_insert_id`].
    fn generates_key(&self, table: &str, column: &str) -> Result<bool> {
        let _ = (table, column);
        Ok(true)
    }

    /// Begin a transaction
    fn begin_transaction(&self) -> Result<()>;

    /// Commit a transaction
    fn commit(&self) -> Result<()>;

    /// Rollback a transaction
    fn rollback(&self) -> Result<()>;

    /// Short driver name used in trace events
    fn driver_name(&self) -> &'static str {
        "unknown"
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn scalar(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        (**self).scalar(sql, params)
    }

    fn last_insert_id(&self) -> Result<Value> {
        (**self).last_insert_id()
    }

    fn generates_key(&self, table: &str, column: &str) -> Result<bool> {
        (**self).generates_key(table, column)
    }

    fn begin_transaction(&self) -> Result<()> {
        (**self).begin_transaction()
    }

    fn commit(&self) -> Result<()> {
        (**self).commit()
    }

    fn rollback(&self) -> Result<()> {
        (**self).rollback()
    }

    fn driver_name(&self) -> &'static str {
        (**self).driver_name()
    }
}
