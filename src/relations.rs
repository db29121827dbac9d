//! Relationship accessors with per-instance caching.

use std::panic::Location;
use std::sync::Arc;

use hashbrown::hash_map::Entry;
use quarry_core::{Direction, QuarryError, Result, Row};

use crate::database::Database;
use crate::model::Model;
use crate::schema::{EntityType, Relation, RelationKind};

/// A resolved relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Related<'db> {
    /// `belongs_to`, `ref` and `has_one`
    One(Option<Model<'db>>),
    /// `has_many`, in key order
    Many(Vec<Model<'db>>),
}

impl<'db> Model<'db> {
    /// Resolves the relation declared as `name`, querying at most once per
    /// instance.
    ///
    /// A name with no relation declared fails with
    /// [`QuarryError::UndefinedMethod`] pointing at the caller.
    #[track_caller]
    pub fn related(&mut self, name: &str) -> Result<&mut Related<'db>> {
        let relation = self.declared(name, Location::caller())?;
        let related = match self.relations.entry(name.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(resolve(self.db, &self.ty, &self.fields, name, &relation)?)
            }
        };
        Ok(related)
    }

    /// The single related instance of a `belongs_to`, `ref` or `has_one`
    /// relation.
    #[track_caller]
    pub fn one(&mut self, name: &str) -> Result<Option<&mut Model<'db>>> {
        let relation = self.declared(name, Location::caller())?;
        let ty = Arc::clone(&self.ty);
        if relation.kind.is_many() {
            return Err(kind_error(&ty, name, "single-valued", relation.kind));
        }
        match self.related(name)? {
            Related::One(model) => Ok(model.as_mut()),
            Related::Many(_) => Err(kind_error(&ty, name, "single-valued", relation.kind)),
        }
    }

    /// Every related instance of a `has_many` relation.
    #[track_caller]
    pub fn many(&mut self, name: &str) -> Result<&mut [Model<'db>]> {
        let relation = self.declared(name, Location::caller())?;
        let ty = Arc::clone(&self.ty);
        let expected = RelationKind::HasMany.as_str();
        if !relation.kind.is_many() {
            return Err(kind_error(&ty, name, expected, relation.kind));
        }
        match self.related(name)? {
            Related::Many(models) => Ok(models.as_mut_slice()),
            Related::One(_) => Err(kind_error(&ty, name, expected, relation.kind)),
        }
    }

    /// Whether `name` has been resolved and cached on this instance.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Drops cached relations that were resolved from `field`.
    pub(crate) fn invalidate(&mut self, field: &str) {
        let ty = &self.ty;
        self.relations.retain(|name, _| match ty.relation(name) {
            Some(relation) => match relation.kind {
                RelationKind::BelongsTo | RelationKind::Ref => {
                    relation.foreign_key_or(name) != field
                }
                RelationKind::HasOne | RelationKind::HasMany => ty.key_name() != field,
            },
            None => true,
        });
    }

    fn declared(&self, name: &str, caller: &'static Location<'static>) -> Result<Relation> {
        self.ty
            .relation(name)
            .cloned()
            .ok_or_else(|| QuarryError::UndefinedMethod {
                entity: self.ty.name().to_owned(),
                method: name.to_owned(),
                file: caller.file(),
                line: caller.line(),
            })
    }
}

fn kind_error(
    ty: &EntityType,
    name: &str,
    expected: &'static str,
    actual: RelationKind,
) -> QuarryError {
    QuarryError::RelationKind {
        entity: ty.name().to_owned(),
        relation: name.to_owned(),
        expected,
        actual: actual.as_str(),
    }
}

fn resolve<'db>(
    db: &'db Database,
    ty: &EntityType,
    fields: &Row,
    name: &str,
    relation: &Relation,
) -> Result<Related<'db>> {
    let target = db.entity(&relation.target)?;
    let column = relation.foreign_key_or(name);

    match relation.kind {
        RelationKind::BelongsTo | RelationKind::Ref => {
            let reference = fields.value(column);
            if reference.is_null() {
                return Ok(Related::One(None));
            }
            Ok(Related::One(target.get(reference.clone())?))
        }
        RelationKind::HasOne | RelationKind::HasMany => {
            let key = fields.value(ty.key_name());
            if key.is_null() {
                return Ok(match relation.kind {
                    RelationKind::HasMany => Related::Many(Vec::new()),
                    _ => Related::One(None),
                });
            }

            let mut query = target.query();
            query
                .r#where((column, key.clone()))
                .order_by(target.entity_type().key_name(), Direction::Asc);
            match relation.kind {
                RelationKind::HasMany => Ok(Related::Many(query.fetch()?)),
                _ => Ok(Related::One(query.single()?)),
            }
        }
    }
}
