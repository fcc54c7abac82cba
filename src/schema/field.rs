//! Field definitions produced by schema plugins.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::registry::TypeRef;
use crate::sql::{Fragment, OrderDirection, QueryBuilder, QueryError};

/// Resolves one field into a SQL expression evaluated inside the parent's
/// query, then reshapes the JSON the database returned for it.
pub trait FieldResolver: Send + Sync + fmt::Debug {
    fn select(&self, parent: &QueryBuilder, args: &FieldArgs) -> Result<Fragment, QueryError>;

    fn shape(&self, raw: Value) -> Value {
        raw
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub args: Vec<ArgSpec>,
    pub resolver: Arc<dyn FieldResolver>,
    /// What contributed this field, used in build errors
    pub origin: String,
}

impl FieldSpec {
    pub fn arg(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderSpec {
    pub column: String,
    #[serde(default)]
    pub direction: OrderDirection,
}

impl OrderSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Desc,
        }
    }
}

/// Arguments of one field invocation, as supplied by the host.
///
/// `condition` keeps JSON semantics: a key that is present with `null` is
/// different from a key that is absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldArgs {
    #[serde(default)]
    pub condition: Option<Map<String, Value>>,
    #[serde(default)]
    pub order_by: Vec<OrderSpec>,
    pub first: Option<u64>,
    pub offset: Option<u64>,
    pub after: Option<String>,
    pub before: Option<String>,
    /// Right-table columns to include in each node; empty selects all readable ones
    #[serde(default)]
    pub columns: Vec<String>,
}

impl FieldArgs {
    pub fn from_json(args: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(args)
    }
}
