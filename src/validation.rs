//! Field validation rules and their evaluation against a row.

use std::sync::LazyLock;

use quarry_core::{QuarryError, Result, Row, Value};
use regex::Regex;

use crate::schema::EntityType;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// Character classes accepted by [`Rule::Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCheck {
    /// Any finite number, including numeric text such as `"12.5"`
    Numeric,
    /// An integer or text of an optional sign followed by digits
    Integer,
    /// A real value or text that parses as one
    Float,
    /// ASCII letters only
    Alpha,
    /// ASCII letters and digits only
    Alnum,
}

impl TypeCheck {
    fn check(self, value: &Value) -> bool {
        match self {
            TypeCheck::Numeric => value.as_f64().is_some(),
            TypeCheck::Integer => match value {
                Value::Integer(_) => true,
                Value::Text(s) => {
                    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
                    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
                }
                _ => false,
            },
            TypeCheck::Float => match value {
                Value::Real(r) => r.is_finite(),
                Value::Integer(_) => true,
                Value::Text(_) => value.as_f64().is_some(),
                _ => false,
            },
            TypeCheck::Alpha => text_all(value, |c| c.is_ascii_alphabetic()),
            TypeCheck::Alnum => match value {
                Value::Integer(i) => *i >= 0,
                _ => text_all(value, |c| c.is_ascii_alphanumeric()),
            },
        }
    }
}

fn text_all(value: &Value, pred: impl Fn(char) -> bool) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(pred))
}

/// Storage class a field must hold. `NULL` is accepted for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Real,
    Text,
    Blob,
}

impl ValueKind {
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (ValueKind::Integer, Value::Integer(_))
                | (ValueKind::Real, Value::Real(_) | Value::Integer(_))
                | (ValueKind::Text, Value::Text(_))
                | (ValueKind::Blob, Value::Blob(_))
        )
    }
}

/// A single named check applied to a field value.
#[derive(Debug, Clone)]
pub enum Rule {
    Type(TypeCheck),
    Email,
    /// Fails for empty values (`NULL`, `""`, `"0"`, `0`)
    NotEmpty,
    Regex(Regex),
    /// Length in characters, both ends inclusive
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Numeric range, both ends inclusive
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Equals(Value),
    Contains(String),
    /// A `YYYY-MM-DD` calendar date
    Date,
    Callback(fn(&Value) -> bool),
}

impl Rule {
    /// Compiles `pattern` into a [`Rule::Regex`].
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Rule::Regex)
            .map_err(|e| QuarryError::Other(format!("invalid validation pattern: {e}")))
    }

    pub fn check(&self, value: &Value) -> bool {
        match self {
            Rule::Type(check) => check.check(value),
            Rule::Email => value.as_str().is_some_and(|s| EMAIL_RE.is_match(s)),
            Rule::NotEmpty => !value.is_empty(),
            Rule::Regex(re) => re.is_match(&value.to_string()),
            Rule::Length { min, max } => {
                let len = value.to_string().chars().count();
                min.is_none_or(|min| len >= min) && max.is_none_or(|max| len <= max)
            }
            Rule::Range { min, max } => value.as_f64().is_some_and(|n| {
                min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
            }),
            Rule::Equals(expected) => value == expected || value.to_string() == expected.to_string(),
            Rule::Contains(needle) => value.to_string().contains(needle.as_str()),
            Rule::Date => value
                .as_str()
                .is_some_and(|s| DATE_RE.is_match(s) && valid_date(s)),
            Rule::Callback(f) => f(value),
        }
    }
}

fn valid_date(s: &str) -> bool {
    let mut parts = s.split('-').map(str::parse::<u32>);
    let (Some(Ok(year)), Some(Ok(month)), Some(Ok(day))) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days).contains(&day)
}

/// The rules declared for one field.
///
/// ```
/// use quarry::validation::{FieldRules, Rule, TypeCheck};
/// use quarry::Value;
///
/// let rules = FieldRules::new()
///     .rule(Rule::Type(TypeCheck::Numeric))
///     .skip_if_empty();
/// assert!(rules.check(&Value::Null));
/// assert!(rules.check(&Value::from("42")));
/// assert!(!rules.check(&Value::from("forty-two")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
    skip_if_empty: bool,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Passes empty values without running any rule.
    pub fn skip_if_empty(mut self) -> Self {
        self.skip_if_empty = true;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn check(&self, value: &Value) -> bool {
        if self.skip_if_empty && value.is_empty() {
            return true;
        }
        self.rules.iter().all(|rule| rule.check(value))
    }
}

impl From<Rule> for FieldRules {
    fn from(rule: Rule) -> Self {
        FieldRules::new().rule(rule)
    }
}

impl<const N: usize> From<[Rule; N]> for FieldRules {
    fn from(rules: [Rule; N]) -> Self {
        FieldRules {
            rules: rules.into(),
            skip_if_empty: false,
        }
    }
}

/// Names of the fields of `row` that fail their declared kind or rules, in
/// declaration order.
pub fn failures(ty: &EntityType, row: &Row) -> Vec<String> {
    ty.fields()
        .iter()
        .filter(|spec| {
            let value = row.value(spec.name());
            let kind_ok = spec.kind().is_none_or(|kind| kind.matches(value));
            let rules_ok = spec.rules().is_none_or(|rules| rules.check(value));
            !(kind_ok && rules_ok)
        })
        .map(|spec| spec.name().to_owned())
        .collect()
}

/// Checks `row` against every field declaration of `ty`.
pub fn verify(ty: &EntityType, row: &Row) -> Result<()> {
    let failed = failures(ty, row);
    if failed.is_empty() {
        return Ok(());
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(entity = ty.name(), fields = ?failed, "quarry.validation failed");
    Err(QuarryError::Validation(failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::row;

    #[test]
    fn test_type_checks() {
        assert!(Rule::Type(TypeCheck::Numeric).check(&Value::from(1)));
        assert!(Rule::Type(TypeCheck::Numeric).check(&Value::from("-1.5")));
        assert!(!Rule::Type(TypeCheck::Numeric).check(&Value::from("1e")));
        assert!(Rule::Type(TypeCheck::Integer).check(&Value::from("-12")));
        assert!(!Rule::Type(TypeCheck::Integer).check(&Value::from("1.2")));
        assert!(Rule::Type(TypeCheck::Float).check(&Value::from(1.25)));
        assert!(Rule::Type(TypeCheck::Alpha).check(&Value::from("Joe")));
        assert!(!Rule::Type(TypeCheck::Alpha).check(&Value::from("Joe1")));
        assert!(Rule::Type(TypeCheck::Alnum).check(&Value::from("Joe1")));
        assert!(!Rule::Type(TypeCheck::Alnum).check(&Value::from("Joe 1")));
    }

    #[test]
    fn test_email() {
        assert!(Rule::Email.check(&Value::from("joe@example.com")));
        assert!(!Rule::Email.check(&Value::from("Joe")));
        assert!(!Rule::Email.check(&Value::Null));
    }

    #[test]
    fn test_length_and_range() {
        let length = Rule::Length {
            min: Some(2),
            max: Some(4),
        };
        assert!(length.check(&Value::from("héé")));
        assert!(!length.check(&Value::from("a")));
        assert!(!length.check(&Value::from("abcde")));

        let range = Rule::Range {
            min: Some(0.0),
            max: None,
        };
        assert!(range.check(&Value::from(10)));
        assert!(!range.check(&Value::from(-1)));
        assert!(!range.check(&Value::from("abc")));
    }

    #[test]
    fn test_date() {
        assert!(Rule::Date.check(&Value::from("2024-02-29")));
        assert!(!Rule::Date.check(&Value::from("2023-02-29")));
        assert!(!Rule::Date.check(&Value::from("2023-13-01")));
        assert!(!Rule::Date.check(&Value::from("01/02/2023")));
    }

    #[test]
    fn test_pattern_equals_contains_callback() {
        let rule = Rule::pattern(r"^[a-z]+$").unwrap();
        assert!(rule.check(&Value::from("abc")));
        assert!(!rule.check(&Value::from("ABC")));
        assert!(Rule::pattern("(").is_err());

        assert!(Rule::Equals(Value::from(1)).check(&Value::from("1")));
        assert!(Rule::Contains("oe".into()).check(&Value::from("Joe")));

        fn even(v: &Value) -> bool {
            v.as_i64().is_some_and(|i| i % 2 == 0)
        }
        assert!(Rule::Callback(even).check(&Value::from(4)));
        assert!(!Rule::Callback(even).check(&Value::from(3)));
    }

    #[test]
    fn test_skip_if_empty() {
        let rules = FieldRules::from(Rule::NotEmpty);
        assert!(!rules.check(&Value::from("0")));
        assert!(rules.clone().skip_if_empty().check(&Value::from("0")));
    }

    #[test]
    fn test_value_kind() {
        assert!(ValueKind::Integer.matches(&Value::Null));
        assert!(ValueKind::Real.matches(&Value::from(1)));
        assert!(!ValueKind::Integer.matches(&Value::from("1")));
        assert!(ValueKind::Blob.matches(&Value::from(vec![1u8])));
    }

    #[test]
    fn test_failures_in_declaration_order() {
        let ty = EntityType::new("Foo")
            .rules("name", Rule::Email)
            .rules("id", FieldRules::from(Rule::Type(TypeCheck::Numeric)).skip_if_empty())
            .kind("age", ValueKind::Integer);

        let row = row! { "id" => "x", "name" => "Joe", "age" => "old" };
        assert_eq!(failures(&ty, &row), ["name", "id", "age"]);

        let err = verify(&ty, &row).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed for: name, id, age");

        let row = row! { "name" => "joe@example.com", "age" => 30 };
        assert!(verify(&ty, &row).is_ok());
    }
}
