use std::fmt::{self, Display};

use crate::Value;

/// A rendered statement: SQL text with `?` placeholders plus the values bound
/// to them, in placeholder order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SQL {
    sql: String,
    params: Vec<Value>,
}

impl SQL {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        SQL {
            sql: sql.into(),
            params,
        }
    }

    /// A statement without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[inline]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub(crate) fn push_ident(&mut self, ident: &str) {
        push_quoted(&mut self.sql, ident);
    }

    pub(crate) fn push_param(&mut self, value: Value) {
        self.sql.push('?');
        self.params.push(value);
    }

    pub(crate) fn append(&mut self, other: SQL) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }
}

impl Display for SQL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl PartialEq<&str> for SQL {
    fn eq(&self, other: &&str) -> bool {
        self.sql == *other
    }
}

/// Quotes an identifier with backticks, doubling any embedded backtick.
pub fn quote_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    push_quoted(&mut out, ident);
    out
}

fn push_quoted(out: &mut String, ident: &str) {
    out.push('`');
    for ch in ident.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
}

/// True for a plain identifier, optionally dotted (`table.column`).
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("foo"), "`foo`");
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("bar"));
        assert!(is_identifier("post.created_at"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("bar;drop"));
        assert!(!is_identifier("a..b"));
    }
}
