#![cfg(feature = "rusqlite")]

use quarry::prelude::*;

mod common;
use common::setup_db;

fn seed_qwerty(db: &Database) {
    let mut q = db.entity("Qwerty").unwrap().new();
    q.set("foo", "asdf").set("bar", "qwerty");
    q.put().unwrap();
}

//------------------------------------------------------------------------------
// Rendering
//------------------------------------------------------------------------------

#[test]
fn test_sql_conditions() {
    let db = setup_db();
    let qwerty = db.entity("Qwerty").unwrap();

    let mut query = qwerty.query();
    query.r#where(("foo", "one")).r#where(("foo", "two"));
    assert_eq!(
        query.sql().unwrap().sql(),
        "select * from `qwerty` where `foo` = ? and `foo` = ?"
    );

    let mut query = qwerty.query();
    query.r#where(("foo", "one")).or_where(("bar", "two"));
    assert_eq!(
        query.sql().unwrap().sql(),
        "select * from `qwerty` where `foo` = ? or `bar` = ?"
    );

    let mut query = qwerty.query();
    query.r#where([("foo", "one"), ("bar", "two")]);
    assert_eq!(
        query.sql().unwrap().sql(),
        "select * from `qwerty` where (`foo` = ? and `bar` = ?)"
    );

    let mut query = qwerty.query();
    query.r#where(nested(|q| {
        q.r#where(("foo", "one"));
        q.r#where(("bar", "two"));
    }));
    let sql = query.sql().unwrap();
    assert_eq!(sql.sql(), "select * from `qwerty` where (`foo` = ? and `bar` = ?)");
    assert_eq!(sql.params(), &[Value::from("one"), Value::from("two")]);

    let mut query = qwerty.query();
    query.r#where(raw(r#"foo = "one""#));
    assert_eq!(query.sql().unwrap().sql(), r#"select * from `qwerty` where foo = "one""#);
}

#[test]
fn test_sql_projection_group_order() {
    let db = setup_db();
    let qwerty = db.entity("Qwerty").unwrap();

    let mut query = qwerty.query_with("count(*)");
    query.r#where(nested(|q| {
        q.r#where(("foo", "one"));
        q.r#where(("bar", "two"));
    }));
    assert_eq!(
        query.sql().unwrap().sql(),
        "select count(*) from `qwerty` where (`foo` = ? and `bar` = ?)"
    );

    let query = qwerty.query_with(["foo", "bar"]);
    assert_eq!(query.sql().unwrap().sql(), "select `foo`, `bar` from `qwerty`");

    let mut query = qwerty.query();
    query.group("foo").group("bar");
    assert_eq!(query.sql().unwrap().sql(), "select * from `qwerty` group by `foo`, `bar`");

    let mut query = qwerty.query();
    query.order_by("foo", Direction::Asc).order("bar desc");
    assert_eq!(
        query.sql().unwrap().sql(),
        "select * from `qwerty` order by `foo` asc, bar desc"
    );
}

#[test]
fn test_sql_limit_offset() {
    let db = setup_db();
    let query = db.entity("Qwerty").unwrap().query();

    assert!(matches!(
        query.sql_limit(";delete from qwerty where 1=1"),
        Err(QuarryError::UnsafeQuery(_))
    ));
    assert!(matches!(
        query.sql_page(20, ";delete from qwerty where 1=1"),
        Err(QuarryError::UnsafeQuery(_))
    ));
    assert_eq!(
        query.sql_page(20, 0).unwrap().sql(),
        "select * from `qwerty` limit 20 offset 0"
    );
}

//------------------------------------------------------------------------------
// Execution
//------------------------------------------------------------------------------

#[test]
fn test_count() {
    let db = setup_db();
    let qwerty = db.entity("Qwerty").unwrap();
    assert_eq!(qwerty.query().count().unwrap(), 0);

    seed_qwerty(&db);
    assert_eq!(qwerty.query().count().unwrap(), 1);

    let mut query = qwerty.query();
    query.r#where(("foo", "nope"));
    assert_eq!(query.count().unwrap(), 0);
}

#[test]
fn test_single() {
    let db = setup_db();
    seed_qwerty(&db);
    let qwerty = db.entity("Qwerty").unwrap();

    let single = qwerty.query().single().unwrap().unwrap();
    assert_eq!(single.get("foo"), "asdf");
    assert!(!single.is_new());

    let single = qwerty.query_with(["bar"]).single().unwrap().unwrap();
    assert!(single.get("foo").is_null());
    assert_eq!(single.get("bar"), "qwerty");

    let mut query = qwerty.query();
    query.r#where(("foo", "missing"));
    assert!(query.single().unwrap().is_none());
}

#[test]
fn test_fetch_orig() {
    let db = setup_db();
    seed_qwerty(&db);

    let rows = db.entity("Qwerty").unwrap().query().fetch_orig().unwrap();
    assert_eq!(rows, vec![row! { "foo" => "asdf", "bar" => "qwerty" }]);
}

#[test]
fn test_where_row() {
    let db = setup_db();
    let item = db.entity("Item").unwrap();
    let two = item.load(2).unwrap();

    let mut query = item.query();
    query.r#where(two.fields().clone());
    let found = query.single().unwrap().unwrap();
    assert_eq!(found.fields(), two.fields());
}

#[test]
fn test_fetch_assoc_and_field() {
    let db = setup_db();
    seed_qwerty(&db);
    let qwerty = db.entity("Qwerty").unwrap();

    let assoc = qwerty.query().fetch_assoc("foo", "bar").unwrap();
    assert_eq!(assoc.len(), 1);
    assert_eq!(assoc["asdf"], "qwerty");

    let field = qwerty.query().fetch_field("bar").unwrap();
    assert_eq!(field, vec![Value::from("qwerty")]);

    assert!(matches!(
        qwerty.query().fetch_field("nope"),
        Err(QuarryError::Mapping(_))
    ));
}

#[test]
fn test_fetch_in_result_order() {
    let db = setup_db();
    let item = db.entity("Item").unwrap();

    let mut query = item.query();
    query.r#where(("gallery_id", 2)).order("id desc");
    let titles: Vec<_> = query
        .fetch()
        .unwrap()
        .iter()
        .map(|m| m.get("title").to_string())
        .collect();
    assert_eq!(titles, ["Item Six", "Item Five", "Item Four"]);

    let mut query = item.query();
    query.order_by("id", Direction::Asc);
    let page = query.fetch_page(2, "2").unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].key(), &Value::from(3));
}

#[test]
fn test_where_in_and_operators() {
    let db = setup_db();
    let item = db.entity("Item").unwrap();

    let mut query = item.query();
    query.where_in("id", [1, 3, 5]);
    assert_eq!(query.count().unwrap(), 3);

    let mut query = item.query();
    query.where_in("id", Vec::<i64>::new());
    assert_eq!(query.count().unwrap(), 0);

    let mut query = item.query();
    query
        .where_op("id", Operator::Gt, 4)
        .or_where_op("title", Operator::Like, "%One");
    assert_eq!(query.fetch_field("id").unwrap(), [1, 5, 6].map(Value::from));
}

#[test]
fn test_condition_values_are_not_sql() {
    let db = setup_db();
    let item = db.entity("Item").unwrap();

    let mut query = item.query();
    query.r#where(("title", "x' or '1'='1"));
    assert_eq!(query.count().unwrap(), 0);
    assert_eq!(common::count(&db, "item"), 6);
}
