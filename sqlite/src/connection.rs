//! Connection types and transaction handling for the rusqlite driver

use std::path::Path;

use quarry_core::{Connection, Result, Row, Value, quarry_trace_tx};
use rusqlite::{OptionalExtension, params_from_iter};

/// SQLite transaction types
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SQLiteTransactionType {
    #[default]
    /// A deferred transaction is the default - it does not acquire locks until needed
    Deferred,
    /// An immediate transaction acquires a RESERVED lock immediately
    Immediate,
    /// An exclusive transaction acquires an EXCLUSIVE lock immediately
    Exclusive,
}

impl SQLiteTransactionType {
    const fn begin_sql(self) -> &'static str {
        match self {
            SQLiteTransactionType::Deferred => "BEGIN DEFERRED",
            SQLiteTransactionType::Immediate => "BEGIN IMMEDIATE",
            SQLiteTransactionType::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

/// A rusqlite connection exposed through [`quarry_core::Connection`].
///
/// Transactions are driven with explicit `BEGIN`/`COMMIT`/`ROLLBACK`
/// statements so the caller decides where a unit of work starts and ends.
#[derive(Debug)]
pub struct SQLiteConnection {
    conn: rusqlite::Connection,
    tx_type: SQLiteTransactionType,
}

impl SQLiteConnection {
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn,
            tx_type: SQLiteTransactionType::default(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(rusqlite::Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(rusqlite::Connection::open_in_memory()?))
    }

    /// Sets the locking behaviour used by [`Connection::begin_transaction`].
    pub fn with_transaction_type(mut self, tx_type: SQLiteTransactionType) -> Self {
        self.tx_type = tx_type;
        self
    }

    /// Gets the transaction type
    #[inline]
    pub fn tx_type(&self) -> SQLiteTransactionType {
        self.tx_type
    }

    /// Gets a reference to the underlying connection
    #[inline]
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }

    /// Runs several `;`-separated statements without parameters, e.g. a schema.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn run(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl From<rusqlite::Connection> for SQLiteConnection {
    fn from(conn: rusqlite::Connection) -> Self {
        Self::new(conn)
    }
}

impl Connection for SQLiteConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(params))?)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt.query_map(params_from_iter(params), |row| {
            let mut out = Row::new();
            for (i, name) in columns.iter().enumerate() {
                out.insert(name.as_str(), row.get::<_, Value>(i)?);
            }
            Ok(out)
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn scalar(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt
            .query_row(params_from_iter(params), |row| row.get::<_, Value>(0))
            .optional()?)
    }

    fn last_insert_id(&self) -> Result<Value> {
        Ok(Value::Integer(self.conn.last_insert_rowid()))
    }

    /// Only an `INTEGER PRIMARY KEY` column aliases the rowid, so only such a
    /// column is filled in by SQLite.
    fn generates_key(&self, table: &str, column: &str) -> Result<bool> {
        const SQL: &str = "select (select count(*) from pragma_table_info(?1) where pk > 0) = 1 \
             and exists (select 1 from pragma_table_info(?1) \
             where name = ?2 collate nocase and pk = 1 and upper(type) = 'INTEGER')";
        Ok(self
            .conn
            .query_row(SQL, (table, column), |row| row.get::<_, bool>(0))?)
    }

    fn begin_transaction(&self) -> Result<()> {
        quarry_trace_tx!("begin", self.driver_name());
        self.run(self.tx_type.begin_sql())
    }

    fn commit(&self) -> Result<()> {
        quarry_trace_tx!("commit", self.driver_name());
        self.run("COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        quarry_trace_tx!("rollback", self.driver_name());
        self.run("ROLLBACK")
    }

    fn driver_name(&self) -> &'static str {
        "sqlite.rusqlite"
    }
}
