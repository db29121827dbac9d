//! Executing builder queries against the database.

use std::collections::BTreeMap;
use std::sync::Arc;

use quarry_core::{
    Bound, Direction, IntoCondition, Operator, Projection, QuarryError, QueryBuilder, Result, Row,
    SQL, Value,
};

use crate::database::Database;
use crate::entity::Entity;
use crate::model::Model;
use crate::schema::EntityType;

/// A [`QueryBuilder`] scoped to one entity type, with the execution
/// variants that hydrate models.
///
/// Chaining methods mirror the builder and return `&mut Self`; rendering
/// and execution borrow immutably, so a query can be rendered and run
/// several times.
#[derive(Debug, Clone)]
pub struct Query<'db> {
    db: &'db Database,
    ty: Arc<EntityType>,
    builder: QueryBuilder,
}

impl<'db> Query<'db> {
    pub(crate) fn new(db: &'db Database, ty: Arc<EntityType>) -> Self {
        let builder = QueryBuilder::new(ty.table_name());
        Query { db, ty, builder }
    }

    #[inline]
    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    #[inline]
    pub fn builder_mut(&mut self) -> &mut QueryBuilder {
        &mut self.builder
    }

    pub fn select(&mut self, projection: impl Into<Projection>) -> &mut Self {
        self.builder.select(projection);
        self
    }

    pub fn r#where(&mut self, condition: impl IntoCondition) -> &mut Self {
        self.builder.r#where(condition);
        self
    }

    pub fn or_where(&mut self, condition: impl IntoCondition) -> &mut Self {
        self.builder.or_where(condition);
        self
    }

    pub fn where_op(
        &mut self,
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.builder.where_op(field, op, value);
        self
    }

    pub fn or_where_op(
        &mut self,
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.builder.or_where_op(field, op, value);
        self
    }

    pub fn where_in<V: Into<Value>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.builder.where_in(field, values);
        self
    }

    pub fn or_where_in<V: Into<Value>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.builder.or_where_in(field, values);
        self
    }

    pub fn group(&mut self, field: impl Into<String>) -> &mut Self {
        self.builder.group(field);
        self
    }

    pub fn order(&mut self, spec: &str) -> &mut Self {
        self.builder.order(spec);
        self
    }

    pub fn order_by(&mut self, field: impl Into<String>, direction: Direction) -> &mut Self {
        self.builder.order_by(field, direction);
        self
    }

    pub fn sql(&self) -> Result<SQL> {
        self.builder.sql()
    }

    pub fn sql_limit(&self, limit: impl Bound) -> Result<SQL> {
        self.builder.sql_limit(limit)
    }

    pub fn sql_page(&self, limit: impl Bound, offset: impl Bound) -> Result<SQL> {
        self.builder.sql_page(limit, offset)
    }

    /// Number of rows matching the conditions.
    pub fn count(&self) -> Result<u64> {
        let value = self.db.scalar(&self.builder.count_sql()?)?;
        match value {
            Some(Value::Integer(n)) => u64::try_from(n)
                .map_err(|_| QuarryError::Mapping(format!("negative row count: {n}"))),
            Some(other) => Err(QuarryError::Mapping(format!(
                "count returned {} instead of an integer",
                other.kind_name()
            ))),
            None => Ok(0),
        }
    }

    /// The first matching row as a model.
    pub fn single(&self) -> Result<Option<Model<'db>>> {
        let rows = self.db.rows(&self.builder.sql_limit(1u64)?)?;
        Ok(rows.into_iter().next().map(|row| self.entity().hydrate(row)))
    }

    /// Every matching row as a model, in result order.
    pub fn fetch(&self) -> Result<Vec<Model<'db>>> {
        let rows = self.fetch_orig()?;
        let entity = self.entity();
        Ok(rows.into_iter().map(|row| entity.hydrate(row)).collect())
    }

    /// One page of models.
    pub fn fetch_page(&self, limit: impl Bound, offset: impl Bound) -> Result<Vec<Model<'db>>> {
        let rows = self.db.rows(&self.builder.sql_page(limit, offset)?)?;
        let entity = self.entity();
        Ok(rows.into_iter().map(|row| entity.hydrate(row)).collect())
    }

    /// The matching rows as plain snapshots, without wrapping them in models.
    pub fn fetch_orig(&self) -> Result<Vec<Row>> {
        self.db.rows(&self.builder.sql()?)
    }

    /// A map from each row's `key` column, as text, to its `value` column.
    /// Later rows overwrite earlier ones with the same key.
    pub fn fetch_assoc(&self, key: &str, value: &str) -> Result<BTreeMap<String, Value>> {
        self.fetch_orig()?
            .into_iter()
            .map(|row| Ok((column(&row, key)?.to_string(), column(&row, value)?)))
            .collect()
    }

    /// The values of one column, in result order.
    pub fn fetch_field(&self, field: &str) -> Result<Vec<Value>> {
        self.fetch_orig()?
            .into_iter()
            .map(|row| column(&row, field))
            .collect()
    }

    fn entity(&self) -> Entity<'db> {
        Entity::bind(self.db, Arc::clone(&self.ty))
    }
}

fn column(row: &Row, field: &str) -> Result<Value> {
    row.get(field)
        .cloned()
        .ok_or_else(|| QuarryError::Mapping(format!("column `{field}` is not in the result")))
}
