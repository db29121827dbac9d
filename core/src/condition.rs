//! WHERE predicates as a tree of AND/OR-joined clauses.
//!
//! Every comparison value becomes a `?` placeholder. The only text that reaches
//! the statement verbatim is a [`Raw`] fragment, which the caller vouches for.

use crate::{QueryBuilder, Row, SQL, Value};

/// How a clause attaches to the clause before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Joiner {
    #[default]
    And,
    Or,
}

impl Joiner {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Joiner::And => " and ",
            Joiner::Or => " or ",
        }
    }
}

/// Comparison operators accepted by [`Condition::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
}

impl Operator {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "like",
        }
    }
}

/// A node of the condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field <op> ?`
    Compare {
        field: String,
        op: Operator,
        value: Value,
    },
    /// `field in (?, ?, ...)`
    In { field: String, values: Vec<Value> },
    /// A trusted fragment, rendered as given
    Raw(String),
    /// A parenthesized sub-tree
    Group(Vec<Clause>),
}

/// A condition together with the joiner that links it to its predecessor.
/// The joiner of the first clause in a list is never rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub joiner: Joiner,
    pub condition: Condition,
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Compare {
            field: field.into(),
            op: Operator::Eq,
            value: value.into(),
        }
    }

    /// Builds an AND group from `(field, value)` pairs, keeping their order.
    /// Returns `None` for no pairs, since `()` is not valid SQL.
    pub fn all<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Option<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let clauses: Vec<Clause> = pairs
            .into_iter()
            .map(|(field, value)| Clause {
                joiner: Joiner::And,
                condition: Condition::eq(field, value),
            })
            .collect();
        (!clauses.is_empty()).then_some(Condition::Group(clauses))
    }

    pub(crate) fn render(&self, out: &mut SQL) {
        match self {
            Condition::Compare { field, op, value } => {
                out.push_ident(field);
                match (op, value) {
                    (Operator::Eq, Value::Null) => out.push_str(" is null"),
                    (Operator::NotEq, Value::Null) => out.push_str(" is not null"),
                    _ => {
                        out.push_str(" ");
                        out.push_str(op.as_sql());
                        out.push_str(" ");
                        out.push_param(value.clone());
                    }
                }
            }
            Condition::In { field, values } => {
                if values.is_empty() {
                    out.push_str("1 = 0");
                    return;
                }
                out.push_ident(field);
                out.push_str(" in (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_param(value.clone());
                }
                out.push_str(")");
            }
            Condition::Raw(fragment) => out.push_str(fragment),
            Condition::Group(clauses) => {
                out.push_str("(");
                render_clauses(clauses, out);
                out.push_str(")");
            }
        }
    }
}

pub(crate) fn render_clauses(clauses: &[Clause], out: &mut SQL) {
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            out.push_str(clause.joiner.as_sql());
        }
        clause.condition.render(out);
    }
}

//------------------------------------------------------------------------------
// Inputs accepted by where / or_where
//------------------------------------------------------------------------------

/// Anything that can become one clause of a WHERE tree.
///
/// Implemented for `(field, value)` pairs, arrays and vectors of pairs and
/// [`Row`]s (which become a parenthesized AND group), [`Raw`] fragments, [`Nested`] builder
/// callbacks and plain [`Condition`]s. `None` means "adds nothing".
pub trait IntoCondition {
    fn into_condition(self) -> Option<Condition>;
}

impl IntoCondition for Condition {
    fn into_condition(self) -> Option<Condition> {
        match self {
            Condition::Group(ref clauses) if clauses.is_empty() => None,
            other => Some(other),
        }
    }
}

impl<K, V> IntoCondition for (K, V)
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_condition(self) -> Option<Condition> {
        Some(Condition::eq(self.0, self.1))
    }
}

impl<K, V, const N: usize> IntoCondition for [(K, V); N]
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_condition(self) -> Option<Condition> {
        Condition::all(self)
    }
}

impl<K, V> IntoCondition for Vec<(K, V)>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_condition(self) -> Option<Condition> {
        Condition::all(self)
    }
}

/// Every field of the row must match, e.g. `where(model.fields().clone())`.
impl IntoCondition for Row {
    fn into_condition(self) -> Option<Condition> {
        Condition::all(self)
    }
}

/// A trusted SQL fragment. See [`raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(pub String);

/// Wraps a fragment that is appended to the WHERE clause verbatim, with no
/// parameterization. Only pass text you control.
pub fn raw(fragment: impl Into<String>) -> Raw {
    Raw(fragment.into())
}

impl IntoCondition for Raw {
    fn into_condition(self) -> Option<Condition> {
        (!self.0.trim().is_empty()).then_some(Condition::Raw(self.0))
    }
}

/// A callback that fills a fresh sub-builder. See [`nested`].
pub struct Nested<F>(F);

/// Runs `build` against an empty builder and splices the conditions it adds
/// into the parent as one parenthesized group.
///
/// ```
/// use quarry_core::{QueryBuilder, nested};
///
/// let mut q = QueryBuilder::new("qwerty");
/// q.r#where(nested(|q| {
///     q.r#where(("foo", "one"));
///     q.r#where(("bar", "two"));
/// }));
/// assert_eq!(
///     q.sql().unwrap().sql(),
///     "select * from `qwerty` where (`foo` = ? and `bar` = ?)"
/// );
/// ```
pub fn nested<F>(build: F) -> Nested<F>
where
    F: FnOnce(&mut QueryBuilder),
{
    Nested(build)
}

impl<F> IntoCondition for Nested<F>
where
    F: FnOnce(&mut QueryBuilder),
{
    fn into_condition(self) -> Option<Condition> {
        let mut sub = QueryBuilder::sub_builder();
        (self.0)(&mut sub);
        Condition::Group(sub.into_clauses()).into_condition()
    }
}
