//! Type-level operations for one registered entity type.

use std::sync::Arc;

use quarry_core::{Projection, Result, Row, Value};

use crate::database::Database;
use crate::model::Model;
use crate::query::Query;
use crate::schema::EntityType;

/// Handle for one entity type on a [`Database`], obtained from
/// [`Database::entity`].
#[derive(Debug, Clone)]
pub struct Entity<'db> {
    db: &'db Database,
    ty: Arc<EntityType>,
}

impl<'db> Entity<'db> {
    pub(crate) fn bind(db: &'db Database, ty: Arc<EntityType>) -> Self {
        Entity { db, ty }
    }

    #[inline]
    pub fn entity_type(&self) -> &EntityType {
        &self.ty
    }

    #[inline]
    pub fn database(&self) -> &'db Database {
        self.db
    }

    /// A blank, unsaved instance.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(&self) -> Model<'db> {
        Model::blank(self.db, Arc::clone(&self.ty))
    }

    /// An unsaved instance pre-populated with `fields`.
    pub fn from_row(&self, fields: impl Into<Row>) -> Model<'db> {
        let mut model = self.new();
        model.fields = fields.into();
        model
    }

    /// Loads the row whose key equals `key`.
    ///
    /// A missing row is not an error: the instance comes back empty, still
    /// new, with its error set to `No object by that ID.`.
    pub fn load(&self, key: impl Into<Value>) -> Result<Model<'db>> {
        match self.get(key)? {
            Some(model) => Ok(model),
            None => {
                let mut model = self.new();
                model.error = Some("No object by that ID.".to_owned());
                Ok(model)
            }
        }
    }

    /// The instance whose key equals `key`, if there is one.
    pub fn get(&self, key: impl Into<Value>) -> Result<Option<Model<'db>>> {
        let key = key.into();
        if key.is_null() {
            return Ok(None);
        }
        let mut query = self.query();
        query.r#where((self.ty.key_name(), key));
        query.single()
    }

    /// A query over this type's table selecting every column.
    pub fn query(&self) -> Query<'db> {
        Query::new(self.db, Arc::clone(&self.ty))
    }

    /// A query over this type's table with the given projection.
    pub fn query_with(&self, projection: impl Into<Projection>) -> Query<'db> {
        let mut query = self.query();
        query.select(projection);
        query
    }

    /// Wraps a stored row as a persisted instance.
    pub(crate) fn hydrate(&self, row: Row) -> Model<'db> {
        Model::persisted(self.db, Arc::clone(&self.ty), row)
    }
}
