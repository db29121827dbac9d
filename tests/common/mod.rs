#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use quarry::prelude::*;
use quarry::{Connection, Row};

pub const SCHEMA: &str = "
    create table qwerty (foo char(12), bar char(12));
    create table foo (id int, name char(12));
    create table bar (id int, name char(12), foo int);
    create table gallery (id integer primary key, title char(48));
    create table cover (id integer primary key, gallery integer unique, title char(48));
    create table item (id integer primary key, gallery_id integer, title char(48));

    insert into gallery (id, title) values (1, 'Gallery One');
    insert into cover (id, gallery, title) values (1, 1, 'Cover One');
    insert into item (id, gallery_id, title) values (1, 1, 'Item One');
    insert into item (id, gallery_id, title) values (2, 1, 'Item Two');
    insert into item (id, gallery_id, title) values (3, 1, 'Item Three');
    insert into gallery (id, title) values (2, 'Gallery Two');
    insert into cover (id, gallery, title) values (2, 2, 'Cover Two');
    insert into item (id, gallery_id, title) values (4, 2, 'Item Four');
    insert into item (id, gallery_id, title) values (5, 2, 'Item Five');
    insert into item (id, gallery_id, title) values (6, 2, 'Item Six');
";

pub fn entity_types() -> Vec<EntityType> {
    vec![
        EntityType::new("Qwerty").key("foo"),
        EntityType::new("Foo"),
        EntityType::new("Bar").ref_to("foo", "Foo"),
        EntityType::new("Gallery")
            .has_one("cover", "Cover", "gallery")
            .has_many("items", "Item", "gallery_id"),
        EntityType::new("Cover").belongs_to("gallery", "Gallery"),
        EntityType::new("Item")
            .belongs_to("gallery", "Gallery")
            .foreign_key("gallery", "gallery_id"),
    ]
}

fn sqlite() -> SQLiteConnection {
    let conn = SQLiteConnection::open_in_memory().expect("in-memory database");
    conn.execute_batch(SCHEMA).expect("test schema");
    conn
}

fn register(mut db: Database, types: impl IntoIterator<Item = EntityType>) -> Database {
    for ty in types {
        db.register(ty).expect("unique entity type");
    }
    db
}

/// In-memory database with the fixture schema and every fixture type.
pub fn setup_db() -> Database {
    setup_db_with(entity_types())
}

/// In-memory database with the fixture schema and only `types` registered.
pub fn setup_db_with(types: impl IntoIterator<Item = EntityType>) -> Database {
    register(Database::new(sqlite()), types)
}

/// A connection that counts the queries sent through it.
pub struct CountingConnection {
    inner: SQLiteConnection,
    queries: Rc<Cell<usize>>,
}

impl Connection for CountingConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> quarry::Result<usize> {
        self.inner.execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> quarry::Result<Vec<Row>> {
        self.queries.set(self.queries.get() + 1);
        self.inner.query(sql, params)
    }

    fn scalar(&self, sql: &str, params: &[Value]) -> quarry::Result<Option<Value>> {
        self.queries.set(self.queries.get() + 1);
        self.inner.scalar(sql, params)
    }

    fn last_insert_id(&self) -> quarry::Result<Value> {
        self.inner.last_insert_id()
    }

    fn generates_key(&self, table: &str, column: &str) -> quarry::Result<bool> {
        self.inner.generates_key(table, column)
    }

    fn begin_transaction(&self) -> quarry::Result<()> {
        self.inner.begin_transaction()
    }

    fn commit(&self) -> quarry::Result<()> {
        self.inner.commit()
    }

    fn rollback(&self) -> quarry::Result<()> {
        self.inner.rollback()
    }
}

/// Fixture database whose query count can be read back.
pub fn setup_counting_db() -> (Database, Rc<Cell<usize>>) {
    let queries = Rc::new(Cell::new(0));
    let conn = CountingConnection {
        inner: sqlite(),
        queries: Rc::clone(&queries),
    };
    (register(Database::new(conn), entity_types()), queries)
}

pub fn count(db: &Database, table: &str) -> i64 {
    db.scalar(&SQL::raw(format!("select count(*) from {table}")))
        .expect("count query")
        .and_then(|value| value.as_i64())
        .expect("integer count")
}
