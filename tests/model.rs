#![cfg(feature = "rusqlite")]

use quarry::prelude::*;

mod common;
use common::{count, setup_db};

#[test]
fn test_construct_and_put() {
    let db = setup_db();
    let mut q = db.entity("Qwerty").unwrap().new();
    q.set("foo", "asdf").set("bar", "qwerty");

    assert!(q.is_new());
    assert_eq!(q.get("foo"), "asdf");
    assert!(q.orig().is_empty());

    q.put().unwrap();
    assert_eq!(count(&db, "qwerty"), 1);
    assert!(!q.is_new());
    assert_eq!(q.orig(), &row! { "foo" => "asdf", "bar" => "qwerty" });
    assert_eq!(q.error(), None);
}

#[test]
fn test_orig_is_a_snapshot() {
    let db = setup_db();
    let mut q = db
        .entity("Qwerty")
        .unwrap()
        .from_row(row! { "foo" => "asdf", "bar" => "qwerty" });
    q.put().unwrap();

    q.set("bar", "changed");
    assert_eq!(q.orig().get("bar"), Some(&Value::from("qwerty")));
    assert_eq!(q.get("bar"), "changed");
}

#[test]
fn test_put_updates_by_original_key() {
    let db = setup_db();
    let qwerty = db.entity("Qwerty").unwrap();
    let mut q = qwerty.from_row(row! { "foo" => "asdf", "bar" => "qwerty" });
    q.put().unwrap();

    q.set("bar", "foobar");
    q.put().unwrap();
    let stored = db
        .scalar(&SQL::new(
            "select bar from qwerty where foo = ?",
            vec![Value::from("asdf")],
        ))
        .unwrap();
    assert_eq!(stored, Some(Value::from("foobar")));

    q.set("foo", "renamed");
    q.put().unwrap();
    assert!(qwerty.get("asdf").unwrap().is_none());
    assert_eq!(qwerty.get("renamed").unwrap().unwrap().get("bar"), "foobar");
    assert_eq!(count(&db, "qwerty"), 1);
}

#[test]
fn test_get_returns_equal_instance() {
    let db = setup_db();
    let qwerty = db.entity("Qwerty").unwrap();
    let mut q = qwerty.from_row(row! { "foo" => "asdf", "bar" => "foobar" });
    q.put().unwrap();

    let n = qwerty.get("asdf").unwrap().unwrap();
    assert_eq!(n, q);
    assert_eq!(n.get("bar"), "foobar");

    assert!(qwerty.get("nothing").unwrap().is_none());
}

#[test]
fn test_load() {
    let db = setup_db();
    let gallery = db.entity("Gallery").unwrap();

    let found = gallery.load(1).unwrap();
    assert!(!found.is_new());
    assert_eq!(found.get("title"), "Gallery One");
    assert_eq!(found.error(), None);

    let missing = gallery.load(99).unwrap();
    assert!(missing.is_new());
    assert!(missing.fields().is_empty());
    assert_eq!(missing.error(), Some("No object by that ID."));
}

#[test]
fn test_insert_fills_generated_key() {
    let db = setup_db();
    let mut gallery = db
        .entity("Gallery")
        .unwrap()
        .from_row(row! { "title" => "Gallery Three" });
    gallery.put().unwrap();

    assert_eq!(gallery.key(), &Value::from(3));
    let mut reloaded = db.entity("Gallery").unwrap().load(3).unwrap();
    assert_eq!(reloaded.get("title"), "Gallery Three");

    reloaded.set("title", "scratch");
    reloaded.reload().unwrap();
    assert_eq!(reloaded.fields(), gallery.fields());
}

#[test]
fn test_remove() {
    let db = setup_db();
    let qwerty = db.entity("Qwerty").unwrap();
    qwerty
        .from_row(row! { "foo" => "asdf", "bar" => "foobar" })
        .put()
        .unwrap();

    let mut query = qwerty.query();
    query.r#where(("foo", "asdf")).order("foo asc");
    let mut fetched = query.fetch().unwrap();
    let mut res = fetched.remove(0);
    assert_eq!(res, qwerty.get("asdf").unwrap().unwrap());

    res.remove().unwrap();
    assert_eq!(count(&db, "qwerty"), 0);
    assert!(res.is_new());

    let err = res.remove().unwrap_err();
    assert!(matches!(err, QuarryError::NotFound));
    assert_eq!(res.error(), Some("No rows found"));
}

#[test]
fn test_write_failure_is_recorded() {
    let db = setup_db();
    let cover = db.entity("Cover").unwrap();

    // `gallery` is unique on cover
    let mut dup = cover.from_row(row! { "gallery" => 1, "title" => "Another" });
    assert!(dup.put().is_err());
    assert!(dup.error().is_some());
    assert!(dup.is_new());
    assert_eq!(count(&db, "cover"), 2);

    dup.set("gallery", 3);
    dup.put().unwrap();
    assert_eq!(dup.error(), None);
}

#[test]
fn test_put_on_vanished_row_fails() {
    let db = setup_db();
    let mut item = db.entity("Item").unwrap().load(1).unwrap();
    db.execute(&SQL::raw("delete from item where id = 1")).unwrap();

    item.set("title", "Renamed");
    assert!(matches!(item.put(), Err(QuarryError::NotFound)));
    assert_eq!(item.error(), Some("No rows found"));
    assert_eq!(item.orig().get("title"), Some(&Value::from("Item One")));
}

#[test]
fn test_insert_leaves_plain_key_unset() {
    let db = setup_db();
    let mut foo = db.entity("Foo").unwrap().from_row(row! { "name" => "Four" });
    foo.put().unwrap();

    assert!(!foo.is_new());
    assert!(foo.key().is_null());
    assert_eq!(count(&db, "foo"), 1);

    foo.set("name", "Five");
    assert!(foo.put().is_err());
}

#[test]
fn test_reload_missing_row() {
    let db = setup_db();
    let mut item = db.entity("Item").unwrap().load(1).unwrap();
    db.execute(&SQL::raw("delete from item where id = 1")).unwrap();

    assert!(matches!(item.reload(), Err(QuarryError::NotFound)));
    assert_eq!(item.error(), Some("No rows found"));
}

#[test]
fn test_unknown_entity_type() {
    let db = setup_db();
    assert!(matches!(db.entity("Nope"), Err(QuarryError::UnknownEntity(name)) if name == "Nope"));
}

#[test]
fn test_register_twice_fails() {
    let mut db = setup_db();
    assert!(db.register(EntityType::new("Foo")).is_err());
}

#[test]
fn test_custom_table_name() {
    let db = common::setup_db_with([EntityType::new("Picture").table("item")]);
    let picture = db.entity("Picture").unwrap();
    assert_eq!(picture.query().count().unwrap(), 6);
    assert_eq!(picture.query().sql().unwrap().sql(), "select * from `item`");
}
