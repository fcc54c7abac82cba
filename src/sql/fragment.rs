//! SQL fragments.
//!
//! A [`Fragment`] is a list of tokens rather than a string so that identifiers
//! are always quoted and values always travel as bind parameters. Fragments
//! are concatenated freely and only turned into text by [`Fragment::compile`].

use std::fmt;

use super::ToSql;
use crate::pg_catalog::Table;

/// Quote an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A table alias. Always rendered quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Alias(String);

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_identifier(&self.0))
    }
}

/// A bind parameter together with the PostgreSQL type it is cast to.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlValue {
    pub value: serde_json::Value,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Raw(String),
    Identifier(Vec<String>),
    Alias(Alias),
    Value(SqlValue),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    tokens: Vec<Token>,
}

/// Text plus the values for its `$n` placeholders, ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub text: String,
    pub values: Vec<serde_json::Value>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            tokens: vec![Token::Raw(sql.into())],
        }
    }

    /// Dotted identifier, e.g. `["public", "posts"]` -> `"public"."posts"`
    pub fn identifier<S: AsRef<str>>(parts: &[S]) -> Self {
        Self {
            tokens: vec![Token::Identifier(
                parts.iter().map(|p| p.as_ref().to_string()).collect(),
            )],
        }
    }

    pub fn alias(alias: &Alias) -> Self {
        Self {
            tokens: vec![Token::Alias(alias.clone())],
        }
    }

    pub fn value(value: serde_json::Value, type_name: impl Into<String>) -> Self {
        Self {
            tokens: vec![Token::Value(SqlValue {
                value,
                type_name: type_name.into(),
            })],
        }
    }

    /// String literal, used for JSON keys and cursor prefixes
    pub fn literal(text: &str) -> Self {
        Self::raw(format!("'{}'", text.replace('\'', "''")))
    }

    /// Schema-qualified table name
    pub fn table(table: &Table) -> Self {
        match &table.namespace {
            Some(ns) => Self::identifier(&[ns.as_str(), table.name.as_str()]),
            None => Self::identifier(&[table.name.as_str()]),
        }
    }

    /// `alias."column"`
    pub fn column(alias: &Alias, column: &str) -> Self {
        Self::alias(alias).append_raw(".").append(Self::identifier(&[column]))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn push(&mut self, other: Fragment) {
        self.tokens.extend(other.tokens);
    }

    pub fn push_raw(&mut self, sql: &str) {
        self.tokens.push(Token::Raw(sql.to_string()));
    }

    pub fn append(mut self, other: Fragment) -> Self {
        self.push(other);
        self
    }

    pub fn append_raw(mut self, sql: &str) -> Self {
        self.push_raw(sql);
        self
    }

    /// Join fragments with `separator`; an empty input gives an empty fragment.
    pub fn join(parts: impl IntoIterator<Item = Fragment>, separator: &str) -> Self {
        let mut result = Fragment::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                result.push_raw(separator);
            }
            result.push(part);
        }
        result
    }

    pub fn parens(self) -> Self {
        Fragment::raw("(").append(self).append_raw(")")
    }

    /// `left = right`
    pub fn eq(left: Fragment, right: Fragment) -> Self {
        left.append_raw(" = ").append(right)
    }

    /// Aliases referenced anywhere in this fragment, in order of appearance
    pub fn aliases(&self) -> impl Iterator<Item = &Alias> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Alias(alias) => Some(alias),
            _ => None,
        })
    }

    pub fn compile(&self) -> CompiledQuery {
        let mut text = String::new();
        let mut values = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Raw(sql) => text.push_str(sql),
                Token::Identifier(parts) => {
                    let quoted: Vec<String> = parts.iter().map(|p| quote_identifier(p)).collect();
                    text.push_str(&quoted.join("."));
                }
                Token::Alias(alias) => text.push_str(&alias.to_string()),
                Token::Value(v) => {
                    values.push(v.value.clone());
                    text.push_str(&format!("${}::{}", values.len(), render_type_name(&v.type_name)));
                }
            }
        }
        CompiledQuery { text, values }
    }
}

impl ToSql for Fragment {
    fn to_sql(&self) -> String {
        self.compile().text
    }
}

fn render_type_name(type_name: &str) -> String {
    let plain = !type_name.is_empty()
        && type_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        type_name.to_string()
    } else {
        quote_identifier(type_name)
    }
}
