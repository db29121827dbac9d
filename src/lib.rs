//! # quarry
//!
//! An active-record data-access layer: entity types described once, rows
//! loaded into models, and a fluent builder that renders parameterized SQL.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! # fn main() -> quarry::Result<()> {
//! let mut db = Database::open_in_memory()?;
//! db.execute(&SQL::raw(
//!     "create table gallery (id integer primary key, title text)",
//! ))?;
//! db.execute(&SQL::raw(
//!     "create table item (id integer primary key, gallery_id integer, title text)",
//! ))?;
//!
//! db.register(EntityType::new("Gallery").has_many("items", "Item", "gallery_id"))?;
//! db.register(
//!     EntityType::new("Item")
//!         .belongs_to("gallery", "Gallery")
//!         .foreign_key("gallery", "gallery_id")
//!         .rules("title", Rule::NotEmpty),
//! )?;
//!
//! let mut gallery = db.entity("Gallery")?.from_row(row! { "title" => "Gallery One" });
//! gallery.put()?;
//!
//! db.entity("Item")?.batch([
//!     row! { "gallery_id" => gallery.key(), "title" => "Item One" },
//!     row! { "gallery_id" => gallery.key(), "title" => "Item Two" },
//! ])?;
//!
//! let items = gallery.many("items")?;
//! assert_eq!(items.len(), 2);
//! assert_eq!(items[1].one("gallery")?.unwrap().get("title"), "Gallery One");
//!
//! let mut query = db.entity("Item")?.query();
//! query.r#where(("title", "Item One")).or_where(("title", "Item Two"));
//! assert_eq!(
//!     query.sql()?.sql(),
//!     "select * from `item` where `title` = ? or `title` = ?"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature    | Default | Enables                                      |
//! |------------|---------|----------------------------------------------|
//! | `rusqlite` | yes     | the SQLite driver in [`sqlite`]              |
//! | `tracing`  | no      | `tracing` events for statements and transactions |
//! | `serde`    | no      | `Serialize`/`Deserialize` for [`Value`] and [`Row`] |

mod batch;
mod database;
mod entity;
mod model;
mod query;
mod relations;
pub mod schema;
pub mod validation;

pub use batch::Outcome;
pub use database::Database;
pub use entity::Entity;
pub use model::Model;
pub use query::Query;
pub use relations::Related;
pub use schema::{EntityType, FieldSpec, Relation, RelationKind};
pub use validation::{FieldRules, Rule, TypeCheck, ValueKind};

pub use quarry_core::error::{QuarryError, Result};
pub use quarry_core::{
    Bound, Clause, Condition, Connection, Direction, IntoCondition, Joiner, Operator, Projection,
    QueryBuilder, Row, SQL, Value, nested, quote_ident, raw, row,
};

/// The SQLite driver.
#[cfg(feature = "rusqlite")]
pub use quarry_sqlite as sqlite;

/// Everything needed to declare entity types and work with models.
pub mod prelude {
    pub use crate::{
        Database, Direction, Entity, EntityType, FieldRules, Model, Operator, Outcome,
        QuarryError, Query, Related, Result, Row, Rule, SQL, TypeCheck, Value, ValueKind, nested,
        raw, row,
    };

    #[cfg(feature = "rusqlite")]
    pub use crate::sqlite::{SQLiteConnection, SQLiteTransactionType};
}
