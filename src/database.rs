//! The database handle: one connection plus the registered entity types.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use quarry_core::{Connection, QuarryError, Result, Row, SQL, Value, quarry_trace_query};

use crate::entity::Entity;
use crate::schema::EntityType;

/// Owns the connection and the entity type registry.
///
/// Every model borrows the `Database` it came from. The handle is not `Sync`,
/// so models and transactions stay on the thread that opened them.
pub struct Database {
    conn: Box<dyn Connection>,
    entities: HashMap<String, Arc<EntityType>>,
    pub(crate) in_transaction: Cell<bool>,
}

impl Database {
    pub fn new(conn: impl Connection + 'static) -> Self {
        Database {
            conn: Box::new(conn),
            entities: HashMap::new(),
            in_transaction: Cell::new(false),
        }
    }

    /// Opens an in-memory SQLite database.
    #[cfg(feature = "rusqlite")]
    pub fn open_in_memory() -> Result<Self> {
        Ok(Database::new(quarry_sqlite::SQLiteConnection::open_in_memory()?))
    }

    /// Registers an entity type under its name. Names are unique.
    pub fn register(&mut self, ty: EntityType) -> Result<()> {
        if self.entities.contains_key(ty.name()) {
            return Err(QuarryError::Other(format!(
                "entity type {} is already registered",
                ty.name()
            )));
        }
        self.entities.insert(ty.name().to_owned(), Arc::new(ty));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, ty: EntityType) -> Result<Self> {
        self.register(ty)?;
        Ok(self)
    }

    /// Type-level handle for the entity registered as `name`.
    pub fn entity(&self, name: &str) -> Result<Entity<'_>> {
        self.entity_type(name).map(|ty| Entity::bind(self, ty))
    }

    pub(crate) fn entity_type(&self, name: &str) -> Result<Arc<EntityType>> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| QuarryError::UnknownEntity(name.to_owned()))
    }

    #[inline]
    pub fn connection(&self) -> &dyn Connection {
        self.conn.as_ref()
    }

    /// Runs a statement and returns the number of affected rows.
    pub fn execute(&self, sql: &SQL) -> Result<usize> {
        quarry_trace_query!(sql.sql(), sql.params().len());
        self.conn.execute(sql.sql(), sql.params())
    }

    /// Runs a query and returns its rows.
    pub fn rows(&self, sql: &SQL) -> Result<Vec<Row>> {
        quarry_trace_query!(sql.sql(), sql.params().len());
        self.conn.query(sql.sql(), sql.params())
    }

    /// First column of the first row, if any.
    pub fn scalar(&self, sql: &SQL) -> Result<Option<Value>> {
        quarry_trace_query!(sql.sql(), sql.params().len());
        self.conn.scalar(sql.sql(), sql.params())
    }

    pub fn last_insert_id(&self) -> Result<Value> {
        self.conn.last_insert_id()
    }

    #[inline]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entities.keys().collect();
        names.sort();
        f.debug_struct("Database")
            .field("driver", &self.conn.driver_name())
            .field("entities", &names)
            .field("in_transaction", &self.in_transaction.get())
            .finish()
    }
}
