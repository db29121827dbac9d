//! Entity type descriptors: table, key, relations and per-field rules.

use crate::validation::{FieldRules, ValueKind};

/// The four ways a field can point at another entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The target's back-reference column holds this instance's key; one row.
    HasOne,
    /// Like [`HasOne`](Self::HasOne) but resolves every matching row.
    HasMany,
    /// A column of this row holds the target's key.
    BelongsTo,
    /// Same lookup as [`BelongsTo`](Self::BelongsTo), declared as a plain reference.
    Ref,
}

impl RelationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::Ref => "ref",
        }
    }

    #[inline]
    pub const fn is_many(self) -> bool {
        matches!(self, RelationKind::HasMany)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    /// Registered name of the target entity type
    pub target: String,
    /// Column holding the key. For `has_one`/`has_many` it lives on the target
    /// table; for `belongs_to`/`ref` on this one, defaulting to the field name.
    pub foreign_key: Option<String>,
}

impl Relation {
    /// The key column, falling back to `field` when no override was declared.
    pub fn foreign_key_or<'a>(&'a self, field: &'a str) -> &'a str {
        self.foreign_key.as_deref().unwrap_or(field)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    name: String,
    kind: Option<ValueKind>,
    relation: Option<Relation>,
    rules: Option<FieldRules>,
}

impl FieldSpec {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    #[inline]
    pub fn relation(&self) -> Option<&Relation> {
        self.relation.as_ref()
    }

    #[inline]
    pub fn rules(&self) -> Option<&FieldRules> {
        self.rules.as_ref()
    }
}

/// Describes one kind of entity: its table, primary key and field metadata.
///
/// ```
/// use quarry::{EntityType, FieldRules, Rule, TypeCheck};
///
/// let gallery = EntityType::new("Gallery")
///     .has_one("cover", "Cover", "gallery")
///     .has_many("items", "Item", "gallery_id");
/// assert_eq!(gallery.table_name(), "gallery");
/// assert_eq!(gallery.key_name(), "id");
///
/// let item = EntityType::new("Item")
///     .belongs_to("gallery", "Gallery")
///     .foreign_key("gallery", "gallery_id")
///     .rules("title", FieldRules::from(Rule::Type(TypeCheck::Alnum)).skip_if_empty());
/// assert_eq!(item.relation("gallery").unwrap().foreign_key_or("gallery"), "gallery_id");
/// ```
#[derive(Debug, Clone)]
pub struct EntityType {
    name: String,
    table: String,
    key: String,
    fields: Vec<FieldSpec>,
}

impl EntityType {
    /// A type named `name`, stored in the lower-cased table of the same name
    /// and keyed by `id`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        EntityType {
            table: name.to_lowercase(),
            name,
            key: "id".to_owned(),
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn has_one(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        back_reference: impl Into<String>,
    ) -> Self {
        self.relate(name, RelationKind::HasOne, target, Some(back_reference.into()))
    }

    pub fn has_many(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        back_reference: impl Into<String>,
    ) -> Self {
        self.relate(name, RelationKind::HasMany, target, Some(back_reference.into()))
    }

    pub fn belongs_to(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relate(name, RelationKind::BelongsTo, target, None)
    }

    pub fn ref_to(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relate(name, RelationKind::Ref, target, None)
    }

    /// Overrides the key column of an already declared relation.
    pub fn foreign_key(mut self, name: &str, column: impl Into<String>) -> Self {
        if let Some(relation) = self.spec_mut(name).relation.as_mut() {
            relation.foreign_key = Some(column.into());
        }
        self
    }

    pub fn rules(mut self, field: impl Into<String>, rules: impl Into<FieldRules>) -> Self {
        let field = field.into();
        self.spec_mut(&field).rules = Some(rules.into());
        self
    }

    pub fn kind(mut self, field: impl Into<String>, kind: ValueKind) -> Self {
        let field = field.into();
        self.spec_mut(&field).kind = Some(kind);
        self
    }

    fn relate(
        mut self,
        name: impl Into<String>,
        kind: RelationKind,
        target: impl Into<String>,
        foreign_key: Option<String>,
    ) -> Self {
        let name = name.into();
        self.spec_mut(&name).relation = Some(Relation {
            kind,
            target: target.into(),
            foreign_key,
        });
        self
    }

    fn spec_mut(&mut self, name: &str) -> &mut FieldSpec {
        let index = match self.fields.iter().position(|spec| spec.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(FieldSpec {
                    name: name.to_owned(),
                    ..Default::default()
                });
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    #[inline]
    pub fn key_name(&self) -> &str {
        &self.key
    }

    /// Declared fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.field(name).and_then(FieldSpec::relation)
    }
}
