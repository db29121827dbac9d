//! One entity instance: field storage, original snapshot and persistence.

use std::sync::Arc;

use hashbrown::HashMap;
use quarry_core::{Projection, QuarryError, QueryBuilder, Result, Row, Value};

use crate::database::Database;
use crate::entity::Entity;
use crate::query::Query;
use crate::relations::Related;
use crate::schema::EntityType;
use crate::validation;

/// A single row of an entity type.
///
/// `fields` is the working copy callers read and assign. `orig` is the
/// snapshot as of the last load or successful write and only changes
/// through [`put`](Self::put) and [`reload`](Self::reload).
#[derive(Debug, Clone)]
pub struct Model<'db> {
    pub(crate) db: &'db Database,
    pub(crate) ty: Arc<EntityType>,
    pub(crate) fields: Row,
    pub(crate) orig: Row,
    pub(crate) is_new: bool,
    pub(crate) error: Option<String>,
    pub(crate) relations: HashMap<String, Related<'db>>,
}

impl<'db> Model<'db> {
    pub(crate) fn blank(db: &'db Database, ty: Arc<EntityType>) -> Self {
        Model {
            db,
            ty,
            fields: Row::new(),
            orig: Row::new(),
            is_new: true,
            error: None,
            relations: HashMap::new(),
        }
    }

    pub(crate) fn persisted(db: &'db Database, ty: Arc<EntityType>, row: Row) -> Self {
        Model {
            fields: row.clone(),
            orig: row,
            is_new: false,
            ..Model::blank(db, ty)
        }
    }

    /// Current value of `field`; unset fields read as `NULL`.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.value(field)
    }

    /// Assigns `field`. Cached relations that depend on it are dropped.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let field = field.into();
        self.invalidate(&field);
        self.fields.insert(field, value);
        self
    }

    #[inline]
    pub fn fields(&self) -> &Row {
        &self.fields
    }

    /// The snapshot taken at the last load or successful write.
    #[inline]
    pub fn orig(&self) -> &Row {
        &self.orig
    }

    /// Current primary key value.
    pub fn key(&self) -> &Value {
        self.fields.value(self.ty.key_name())
    }

    #[inline]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Message of the last failed load, validation or write.
    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[inline]
    pub fn entity_type(&self) -> &EntityType {
        &self.ty
    }

    /// The type-level handle for this instance's entity type.
    pub fn entity(&self) -> Entity<'db> {
        Entity::bind(self.db, Arc::clone(&self.ty))
    }

    pub fn query(&self) -> Query<'db> {
        self.entity().query()
    }

    pub fn query_with(&self, projection: impl Into<Projection>) -> Query<'db> {
        self.entity().query_with(projection)
    }

    pub fn into_fields(self) -> Row {
        self.fields
    }

    /// Runs the declared validation rules without writing anything.
    pub fn verify(&mut self) -> Result<()> {
        let result = validation::verify(&self.ty, &self.fields);
        self.record(result)
    }

    /// Validates, then inserts a new instance or updates a stored one.
    ///
    /// Inserts fill a missing or `NULL` key from the connection's last insert
    /// id when the key column is one the database generates. Updates are keyed
    /// by the key value in the original snapshot, so a key can be changed by
    /// assigning it and calling `put`. An update that matches no stored row
    /// fails with [`QuarryError::NotFound`].
    pub fn put(&mut self) -> Result<()> {
        let result = self.write();
        self.record(result)
    }

    fn write(&mut self) -> Result<()> {
        validation::verify(&self.ty, &self.fields)?;
        let ty = Arc::clone(&self.ty);
        let key = ty.key_name();

        if self.is_new {
            let insert = QueryBuilder::new(ty.table_name()).insert_sql(&self.fields);
            self.db.execute(&insert)?;
            if self.fields.value(key).is_null()
                && self.db.connection().generates_key(ty.table_name(), key)?
            {
                let id = self.db.last_insert_id()?;
                self.fields.insert(key, id);
            }
            self.is_new = false;
        } else {
            let mut builder = QueryBuilder::new(ty.table_name());
            builder.r#where((key, self.stored_key()?));
            if self.db.execute(&builder.update_sql(&self.fields)?)? == 0 {
                return Err(QuarryError::NotFound);
            }
        }

        self.orig = self.fields.clone();
        Ok(())
    }

    /// Deletes the stored row. Fails with [`QuarryError::NotFound`] when no
    /// row was removed. The instance is new again afterwards.
    pub fn remove(&mut self) -> Result<()> {
        let result = self.delete();
        self.record(result)
    }

    fn delete(&mut self) -> Result<()> {
        let mut builder = QueryBuilder::new(self.ty.table_name());
        builder.r#where((self.ty.key_name(), self.stored_key()?));
        if self.db.execute(&builder.delete_sql()?)? == 0 {
            return Err(QuarryError::NotFound);
        }
        self.is_new = true;
        self.orig = Row::new();
        self.relations.clear();
        Ok(())
    }

    /// Re-reads the stored row, replacing fields and snapshot and dropping
    /// every cached relation.
    pub fn reload(&mut self) -> Result<()> {
        let result = self.refresh();
        self.record(result)
    }

    fn refresh(&mut self) -> Result<()> {
        let key = self.stored_key()?;
        let stored = self.entity().get(key)?.ok_or(QuarryError::NotFound)?;
        self.fields = stored.fields;
        self.orig = stored.orig;
        self.is_new = false;
        self.relations.clear();
        Ok(())
    }

    fn stored_key(&self) -> Result<Value> {
        let key = self.ty.key_name();
        let value = match self.orig.get(key) {
            Some(value) if !value.is_null() => value,
            _ => self.fields.value(key),
        };
        if value.is_null() {
            return Err(QuarryError::Statement(format!(
                "{} has no value for key `{key}`",
                self.ty.name()
            )));
        }
        Ok(value.clone())
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        self.error = result.as_ref().err().map(ToString::to_string);
        result
    }
}

/// Instances are equal when they are of the same type and hold the same
/// fields, snapshot and persistence state. Cached relations and the last
/// error are not compared.
impl PartialEq for Model<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name()
            && self.is_new == other.is_new
            && self.fields == other.fields
            && self.orig == other.orig
    }
}
