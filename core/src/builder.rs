//! The fluent query builder and the statements it renders.

use std::str::FromStr;

use crate::condition::{Clause, Condition, IntoCondition, Joiner, Operator, render_clauses};
use crate::error::{QuarryError, Result};
use crate::sql::{is_identifier, quote_ident};
use crate::{Row, SQL, Value};

/// The select list of a query.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Projection {
    /// `*`
    #[default]
    All,
    /// A list of column names, each quoted
    Fields(Vec<String>),
    /// An expression such as `count(*)`, rendered as given
    Raw(String),
}

impl From<&str> for Projection {
    fn from(expr: &str) -> Self {
        match expr.trim() {
            "" | "*" => Projection::All,
            expr => Projection::Raw(expr.to_owned()),
        }
    }
}

impl From<String> for Projection {
    fn from(expr: String) -> Self {
        Projection::from(expr.as_str())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Projection {
    fn from(fields: [S; N]) -> Self {
        Projection::Fields(fields.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> From<Vec<S>> for Projection {
    fn from(fields: Vec<S>) -> Self {
        Projection::Fields(fields.into_iter().map(Into::into).collect())
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(QuarryError::UnsafeQuery(format!("invalid sort direction: {s}")))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct OrderBy {
    field: String,
    direction: Option<Direction>,
    /// Parsed from a single `"field dir"` string; rendered bare.
    parsed: bool,
}

/// A LIMIT or OFFSET argument.
///
/// Integers always qualify. Strings qualify only when they are made of ASCII
/// digits, so user input can be passed straight through and anything else is
/// refused before a statement is rendered.
pub trait Bound {
    fn to_bound(&self) -> Result<u64>;
}

macro_rules! impl_bound_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Bound for $ty {
                fn to_bound(&self) -> Result<u64> {
                    Ok(*self as u64)
                }
            }
        )*
    };
}

macro_rules! impl_bound_signed {
    ($($ty:ty),*) => {
        $(
            impl Bound for $ty {
                fn to_bound(&self) -> Result<u64> {
                    u64::try_from(*self).map_err(|_| {
                        QuarryError::UnsafeQuery(format!("negative limit or offset: {self}"))
                    })
                }
            }
        )*
    };
}

impl_bound_unsigned!(u8, u16, u32, u64, usize);
impl_bound_signed!(i8, i16, i32, i64, isize);

impl Bound for str {
    fn to_bound(&self) -> Result<u64> {
        if self.is_empty() || !self.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QuarryError::UnsafeQuery(format!(
                "limit and offset must be numeric, got {self:?}"
            )));
        }
        self.parse::<u64>()
            .map_err(|e| QuarryError::UnsafeQuery(format!("limit or offset out of range: {e}")))
    }
}

impl Bound for String {
    fn to_bound(&self) -> Result<u64> {
        self.as_str().to_bound()
    }
}

impl<T: Bound + ?Sized> Bound for &T {
    fn to_bound(&self) -> Result<u64> {
        (**self).to_bound()
    }
}

/// Builds SELECT, INSERT, UPDATE and DELETE statements against one table.
///
/// ```
/// use quarry_core::{QueryBuilder, Direction};
///
/// let mut q = QueryBuilder::new("qwerty");
/// q.r#where(("foo", "one")).or_where(("bar", "two")).order_by("foo", Direction::Asc);
///
/// let sql = q.sql().unwrap();
/// assert_eq!(sql.sql(), "select * from `qwerty` where `foo` = ? or `bar` = ? order by `foo` asc");
/// assert_eq!(sql.params().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryBuilder {
    table: String,
    projection: Projection,
    clauses: Vec<Clause>,
    group_by: Vec<String>,
    order_by: Vec<OrderBy>,
    rejected: Vec<String>,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        QueryBuilder {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Builder handed to [`nested`](crate::nested) callbacks. Only its
    /// conditions are ever used.
    pub(crate) fn sub_builder() -> Self {
        QueryBuilder::default()
    }

    pub(crate) fn into_clauses(self) -> Vec<Clause> {
        self.clauses
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[inline]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn select(&mut self, projection: impl Into<Projection>) -> &mut Self {
        self.projection = projection.into();
        self
    }

    fn push(&mut self, joiner: Joiner, condition: impl IntoCondition) -> &mut Self {
        if let Some(condition) = condition.into_condition() {
            self.clauses.push(Clause { joiner, condition });
        }
        self
    }

    /// Adds a condition joined with AND.
    ///
    /// Accepts a `(field, value)` pair, an array or vector of pairs (rendered
    /// as one parenthesized AND group), a [`nested`](crate::nested) callback or
    /// a [`raw`](crate::raw) fragment.
    pub fn r#where(&mut self, condition: impl IntoCondition) -> &mut Self {
        self.push(Joiner::And, condition)
    }

    /// Same inputs as [`r#where`](Self::r#where), joined with OR.
    pub fn or_where(&mut self, condition: impl IntoCondition) -> &mut Self {
        self.push(Joiner::Or, condition)
    }

    pub fn where_op(
        &mut self,
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> &mut Self {
        let condition = Condition::Compare {
            field: field.into(),
            op,
            value: value.into(),
        };
        self.push(Joiner::And, condition)
    }

    pub fn or_where_op(
        &mut self,
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> &mut Self {
        let condition = Condition::Compare {
            field: field.into(),
            op,
            value: value.into(),
        };
        self.push(Joiner::Or, condition)
    }

    pub fn where_in<V: Into<Value>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let condition = Condition::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        };
        self.push(Joiner::And, condition)
    }

    pub fn or_where_in<V: Into<Value>>(
        &mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let condition = Condition::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        };
        self.push(Joiner::Or, condition)
    }

    pub fn group(&mut self, field: impl Into<String>) -> &mut Self {
        self.group_by.push(field.into());
        self
    }

    /// Orders by a quoted column in the given direction.
    pub fn order_by(&mut self, field: impl Into<String>, direction: Direction) -> &mut Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            direction: Some(direction),
            parsed: false,
        });
        self
    }

    /// Orders by a `"field"` or `"field direction"` string such as `"bar desc"`.
    ///
    /// The string is parsed, not trusted: the field must be a plain identifier
    /// and the direction `asc` or `desc`. Anything else makes the query fail to
    /// render.
    pub fn order(&mut self, spec: &str) -> &mut Self {
        match parse_order(spec) {
            Ok((field, direction)) => self.order_by.push(OrderBy {
                field: field.to_owned(),
                direction,
                parsed: true,
            }),
            Err(e) => self.rejected.push(e.to_string()),
        }
        self
    }

    /// Renders the SELECT statement.
    pub fn sql(&self) -> Result<SQL> {
        self.render(None, None)
    }

    /// Renders the SELECT statement with a LIMIT.
    pub fn sql_limit(&self, limit: impl Bound) -> Result<SQL> {
        self.render(Some(limit.to_bound()?), None)
    }

    /// Renders the SELECT statement with LIMIT and OFFSET.
    pub fn sql_page(&self, limit: impl Bound, offset: impl Bound) -> Result<SQL> {
        self.render(Some(limit.to_bound()?), Some(offset.to_bound()?))
    }

    pub fn render(&self, limit: Option<u64>, offset: Option<u64>) -> Result<SQL> {
        self.check()?;

        let mut out = SQL::default();
        out.push_str("select ");
        match &self.projection {
            Projection::All => out.push_str("*"),
            Projection::Fields(fields) if fields.is_empty() => out.push_str("*"),
            Projection::Fields(fields) => {
                out.push_str(&join_idents(fields));
            }
            Projection::Raw(expr) => out.push_str(expr),
        }
        self.render_from_where(&mut out);

        if !self.group_by.is_empty() {
            out.push_str(" group by ");
            out.push_str(&join_idents(&self.group_by));
        }

        if !self.order_by.is_empty() {
            out.push_str(" order by ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if order.parsed {
                    out.push_str(&order.field);
                } else {
                    out.push_ident(&order.field);
                }
                if let Some(direction) = order.direction {
                    out.push_str(" ");
                    out.push_str(direction.as_sql());
                }
            }
        }

        if let Some(limit) = limit {
            out.push_str(&format!(" limit {limit}"));
        }
        if let Some(offset) = offset {
            out.push_str(&format!(" offset {offset}"));
        }

        Ok(out)
    }

    /// Renders `select count(*)` over the same conditions. Projection,
    /// grouping and ordering are ignored.
    pub fn count_sql(&self) -> Result<SQL> {
        self.check()?;
        let mut out = SQL::raw("select count(*)");
        self.render_from_where(&mut out);
        Ok(out)
    }

    /// Renders an INSERT of every field in `row`.
    pub fn insert_sql(&self, row: &Row) -> SQL {
        let mut out = SQL::raw("insert into ");
        out.push_ident(&self.table);
        if row.is_empty() {
            out.push_str(" default values");
            return out;
        }

        out.push_str(" (");
        out.push_str(&join_idents(row.fields()));
        out.push_str(") values (");
        for (i, (_, value)) in row.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_param(value.clone());
        }
        out.push_str(")");
        out
    }

    /// Renders an UPDATE setting every field in `row`, restricted by this
    /// builder's conditions. Refuses to render without conditions.
    pub fn update_sql(&self, row: &Row) -> Result<SQL> {
        self.check_scoped("update")?;
        if row.is_empty() {
            return Err(QuarryError::Statement("update with no fields to set".into()));
        }

        let mut out = SQL::raw("update ");
        out.push_ident(&self.table);
        out.push_str(" set ");
        for (i, (field, value)) in row.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_ident(field);
            out.push_str(" = ");
            out.push_param(value.clone());
        }
        self.render_where(&mut out);
        Ok(out)
    }

    /// Renders a DELETE restricted by this builder's conditions. Refuses to
    /// render without conditions.
    pub fn delete_sql(&self) -> Result<SQL> {
        self.check_scoped("delete")?;
        let mut out = SQL::raw("delete from ");
        out.push_ident(&self.table);
        self.render_where(&mut out);
        Ok(out)
    }

    fn check(&self) -> Result<()> {
        match self.rejected.first() {
            Some(reason) => Err(QuarryError::UnsafeQuery(reason.clone())),
            None => Ok(()),
        }
    }

    fn check_scoped(&self, statement: &str) -> Result<()> {
        self.check()?;
        if self.clauses.is_empty() {
            return Err(QuarryError::UnsafeQuery(format!(
                "{statement} on `{}` has no conditions",
                self.table
            )));
        }
        Ok(())
    }

    fn render_from_where(&self, out: &mut SQL) {
        out.push_str(" from ");
        out.push_ident(&self.table);
        self.render_where(out);
    }

    fn render_where(&self, out: &mut SQL) {
        if self.clauses.is_empty() {
            return;
        }
        let mut conditions = SQL::default();
        render_clauses(&self.clauses, &mut conditions);
        out.push_str(" where ");
        out.append(conditions);
    }
}

fn join_idents<I, S>(idents: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    idents
        .into_iter()
        .map(|ident| quote_ident(ident.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_order(spec: &str) -> Result<(&str, Option<Direction>)> {
    let mut parts = spec.split_whitespace();
    let field = parts.next().unwrap_or_default();
    if !is_identifier(field) {
        return Err(QuarryError::UnsafeQuery(format!("invalid order field: {spec:?}")));
    }
    let direction = parts.next().map(Direction::from_str).transpose()?;
    if parts.next().is_some() {
        return Err(QuarryError::UnsafeQuery(format!("invalid order clause: {spec:?}")));
    }
    Ok((field, direction))
}
