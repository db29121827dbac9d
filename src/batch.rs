//! Transactions and multi-row batches.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use quarry_core::{QuarryError, Result, Row};

use crate::database::Database;
use crate::entity::Entity;

/// What a unit of work asks the transaction to do when it returns normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Commit,
    /// Roll back. The transaction reports [`QuarryError::Aborted`].
    Abort,
}

/// Clears the open-transaction flag however the transaction ends.
struct TransactionFlag<'a>(&'a Cell<bool>);

impl Drop for TransactionFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Database {
    /// Runs `f` inside one transaction.
    ///
    /// `Ok(Outcome::Commit)` commits. `Ok(Outcome::Abort)` rolls back and
    /// returns [`QuarryError::Aborted`], and an error from `f` rolls back and
    /// is returned as is. If `f` panics the transaction is rolled back before
    /// the panic continues. Transactions do not nest: opening one while
    /// another is open fails with [`QuarryError::TransactionError`].
    pub fn transaction<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&Database) -> Result<Outcome>,
    {
        if self.in_transaction.replace(true) {
            return Err(QuarryError::TransactionError(
                "a transaction is already open on this database".into(),
            ));
        }
        let _flag = TransactionFlag(&self.in_transaction);

        let conn = self.connection();
        conn.begin_transaction()?;

        let result = catch_unwind(AssertUnwindSafe(|| f(self)));

        match result {
            Ok(Ok(Outcome::Commit)) => {
                if let Err(e) = conn.commit() {
                    let _ = conn.rollback();
                    return Err(e);
                }
                Ok(())
            }
            Ok(Ok(Outcome::Abort)) => {
                conn.rollback()?;
                Err(QuarryError::Aborted)
            }
            Ok(Err(e)) => {
                if let Err(_rollback_err) = conn.rollback() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_rollback_err, "quarry.transaction rollback failed");
                }
                Err(e)
            }
            Err(panic_payload) => {
                let _ = conn.rollback();
                resume_unwind(panic_payload);
            }
        }
    }
}

impl<'db> Entity<'db> {
    /// Inserts one new instance per row, in order, inside one transaction.
    /// Either every row is stored or none is.
    ///
    /// ```
    /// use quarry::{Database, EntityType, row};
    ///
    /// # fn main() -> quarry::Result<()> {
    /// let mut db = Database::open_in_memory()?;
    /// db.register(EntityType::new("Foo"))?;
    /// db.execute(&quarry::SQL::raw("create table foo (id integer primary key, name text)"))?;
    ///
    /// let foo = db.entity("Foo")?;
    /// foo.batch([row! { "name" => "One" }, row! { "name" => "Two" }])?;
    /// assert_eq!(foo.query().count()?, 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn batch<I>(&self, rows: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Row>,
    {
        self.database().transaction(|_| {
            for row in rows {
                self.from_row(row).put()?;
            }
            Ok(Outcome::Commit)
        })
    }

    /// Runs a unit of work inside one transaction. See
    /// [`Database::transaction`] for how its result is applied.
    pub fn batch_with<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&Entity<'db>) -> Result<Outcome>,
    {
        self.database().transaction(|_| f(self))
    }
}
