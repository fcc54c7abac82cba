//! Introspection snapshot of a PostgreSQL database.
//!
//! The catalogue is produced once by introspection (or loaded from a YAML
//! snapshot) and is never mutated afterwards. Relation inference borrows it
//! read-only, so a single snapshot can back every schema build pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use super::errors::CatalogError;
use crate::config::SimpleCollections;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value of a smart tag. Tags arrive already parsed; this crate never reads
/// database comments itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

/// Typed key/value map of extension tags attached to a catalogue entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, TagValue>);

impl Tags {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert, mostly used by tests and fixtures
    pub fn with(mut self, key: impl Into<String>, value: TagValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(TagValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn many_to_many_field_name(&self) -> Option<&str> {
        self.text("manyToManyFieldName")
    }

    pub fn many_to_many_simple_field_name(&self) -> Option<&str> {
        self.text("manyToManySimpleFieldName")
    }

    /// `@simpleCollections` override. Unrecognised values are ignored.
    pub fn simple_collections(&self) -> Option<SimpleCollections> {
        let raw = self.text("simpleCollections")?;
        match raw.parse() {
            Ok(mode) => Some(mode),
            Err(e) => {
                log::warn!("Ignoring simpleCollections tag: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Owning table; stamped by [`Catalogue::new`]
    #[serde(skip)]
    pub table_id: TableId,
    pub num: i16,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub type_modifier: Option<i32>,
    #[serde(default)]
    pub tags: Tags,
}

impl Attribute {
    pub fn new(num: i16, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            table_id: TableId::default(),
            num,
            name: name.into(),
            type_name: type_name.into(),
            type_modifier: None,
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

fn default_selectable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    /// Schema the table lives in; tables without one are never exposed
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default = "default_selectable")]
    pub is_selectable: bool,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub tags: Tags,
}

impl Table {
    pub fn new(
        id: u32,
        namespace: impl Into<String>,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            id: TableId(id),
            namespace: Some(namespace.into()),
            name: name.into(),
            is_selectable: true,
            attributes,
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn attribute(&self, num: i16) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.num == num)
    }
}

/// Constraint variants. Only the fields meaningful to each kind are carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    Primary {
        key_attribute_nums: Vec<i16>,
    },
    Unique {
        key_attribute_nums: Vec<i16>,
    },
    Foreign {
        key_attribute_nums: Vec<i16>,
        foreign_table_id: TableId,
        foreign_key_attribute_nums: Vec<i16>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: u32,
    pub name: String,
    /// Table the constraint is declared on
    pub table_id: TableId,
    #[serde(flatten)]
    pub kind: ConstraintKind,
    #[serde(default)]
    pub tags: Tags,
}

impl Constraint {
    pub fn primary(id: u32, name: impl Into<String>, table_id: u32, nums: Vec<i16>) -> Self {
        Self::with_kind(id, name, table_id, ConstraintKind::Primary { key_attribute_nums: nums })
    }

    pub fn unique(id: u32, name: impl Into<String>, table_id: u32, nums: Vec<i16>) -> Self {
        Self::with_kind(id, name, table_id, ConstraintKind::Unique { key_attribute_nums: nums })
    }

    pub fn foreign(
        id: u32,
        name: impl Into<String>,
        table_id: u32,
        nums: Vec<i16>,
        foreign_table_id: u32,
        foreign_nums: Vec<i16>,
    ) -> Self {
        Self::with_kind(
            id,
            name,
            table_id,
            ConstraintKind::Foreign {
                key_attribute_nums: nums,
                foreign_table_id: TableId(foreign_table_id),
                foreign_key_attribute_nums: foreign_nums,
            },
        )
    }

    fn with_kind(id: u32, name: impl Into<String>, table_id: u32, kind: ConstraintKind) -> Self {
        Self {
            id,
            name: name.into(),
            table_id: TableId(table_id),
            kind,
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn is_foreign(&self) -> bool {
        matches!(self.kind, ConstraintKind::Foreign { .. })
    }

    /// Primary and unique constraints both guarantee at most one row per key
    pub fn is_unique_key(&self) -> bool {
        matches!(
            self.kind,
            ConstraintKind::Primary { .. } | ConstraintKind::Unique { .. }
        )
    }

    pub fn foreign_table_id(&self) -> Option<TableId> {
        match &self.kind {
            ConstraintKind::Foreign { foreign_table_id, .. } => Some(*foreign_table_id),
            _ => None,
        }
    }

    /// Ordinals of the key columns on the table the constraint is declared on
    pub fn key_attribute_nums(&self) -> &[i16] {
        match &self.kind {
            ConstraintKind::Primary { key_attribute_nums }
            | ConstraintKind::Unique { key_attribute_nums }
            | ConstraintKind::Foreign { key_attribute_nums, .. } => key_attribute_nums,
        }
    }

    /// Ordinals of the referenced columns on the foreign table (foreign keys only)
    pub fn foreign_key_attribute_nums(&self) -> &[i16] {
        match &self.kind {
            ConstraintKind::Foreign {
                foreign_key_attribute_nums,
                ..
            } => foreign_key_attribute_nums,
            _ => &[],
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogueSnapshot {
    tables: Vec<Table>,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

/// Immutable snapshot of tables and constraints.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    tables: Vec<Table>,
    constraints: Vec<Constraint>,
    table_index: HashMap<TableId, usize>,
}

impl Catalogue {
    /// Build a catalogue, stamping every attribute with its owning table.
    ///
    /// Constraints are kept in the given order; relation inference follows it.
    pub fn new(mut tables: Vec<Table>, constraints: Vec<Constraint>) -> Result<Self, CatalogError> {
        let mut table_index: HashMap<TableId, usize> = HashMap::with_capacity(tables.len());
        for (idx, table) in tables.iter().enumerate() {
            if let Some(&prev) = table_index.get(&table.id) {
                return Err(CatalogError::DuplicateTable {
                    table_id: table.id.0,
                    first: tables[prev].name.clone(),
                    second: table.name.clone(),
                });
            }
            table_index.insert(table.id, idx);
        }

        for table in tables.iter_mut() {
            let table_id = table.id;
            for attr in table.attributes.iter_mut() {
                attr.table_id = table_id;
            }
        }

        log::debug!(
            "Catalogue snapshot: {} tables, {} constraints",
            tables.len(),
            constraints.len()
        );

        Ok(Self {
            tables,
            constraints,
            table_index,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let snapshot: CatalogueSnapshot =
            serde_yaml::from_str(content).map_err(|e| CatalogError::SnapshotParse {
                error: e.to_string(),
            })?;
        Self::new(snapshot.tables, snapshot.constraints)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::SnapshotRead {
            error: format!("{}: {}", path.display(), e),
        })?;
        let snapshot: CatalogueSnapshot = serde_yaml::from_str(&content).map_err(|e| {
            CatalogError::parse_error_with_context(
                e.to_string(),
                format!("While loading {}", path.display()),
            )
        })?;
        Self::new(snapshot.tables, snapshot.constraints)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.table_index.get(&id).map(|&idx| &self.tables[idx])
    }

    pub fn table_by_name(&self, namespace: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name && t.namespace.as_deref() == Some(namespace))
    }

    /// Constraints declared on `table_id`, in catalogue order
    pub fn constraints_on(&self, table_id: TableId) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints
            .iter()
            .filter(move |con| con.table_id == table_id)
    }

    /// Foreign keys (declared anywhere) whose target is `table_id`, in catalogue order
    pub fn foreign_constraints_referencing(
        &self,
        table_id: TableId,
    ) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints
            .iter()
            .filter(move |con| con.foreign_table_id() == Some(table_id))
    }

    pub fn primary_key(&self, table_id: TableId) -> Option<&Constraint> {
        self.constraints_on(table_id)
            .find(|con| matches!(con.kind, ConstraintKind::Primary { .. }))
    }

    /// Resolve the primary key columns of a table, if it has a primary key.
    pub fn primary_key_attributes(&self, table: &Table) -> Result<Option<Vec<Attribute>>, CatalogError> {
        match self.primary_key(table.id) {
            Some(pk) => self
                .resolve_attributes(table, pk.key_attribute_nums(), pk)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Resolve attribute ordinals of `table` on behalf of `constraint`.
    pub fn resolve_attributes(
        &self,
        table: &Table,
        nums: &[i16],
        constraint: &Constraint,
    ) -> Result<Vec<Attribute>, CatalogError> {
        nums.iter()
            .map(|&num| {
                table
                    .attribute(num)
                    .cloned()
                    .ok_or_else(|| CatalogError::UnresolvedKeyAttribute {
                        constraint: constraint.name.clone(),
                        table: table.name.clone(),
                        num,
                    })
            })
            .collect()
    }
}
