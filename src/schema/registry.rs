//! Type registry shared by every schema plugin.
//!
//! Output and connection types are seeded per table before any plugin runs;
//! plugins add input types during the `types` stage and look everything up
//! again during the `fields` stage.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::errors::SchemaBuildError;
use crate::pg_catalog::{Action, Attribute, Catalogue, Entity, OmitPolicy, Table, TableId};
use crate::utils::NamingStrategy;

/// Reference to a schema type, possibly wrapped in list / non-null modifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn non_null(self) -> Self {
        TypeRef::NonNull(Box::new(self))
    }

    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// Name of the innermost named type
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::NonNull(inner) | TypeRef::List(inner) => inner.name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<InputField>,
    /// What caused this type to exist, used in build errors
    pub origin: String,
}

impl InputObjectType {
    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub trait TypeRegistry {
    fn table_output_type(&self, table: &Table) -> Option<String>;

    fn connection_type(&self, table: &Table) -> Option<String>;

    /// Input type for a column's values, `None` for unmapped PostgreSQL types
    fn attribute_input_type(&self, attr: &Attribute) -> Option<TypeRef>;

    fn input_type(&self, name: &str) -> Option<&InputObjectType>;

    fn register_input_type(&mut self, input_type: InputObjectType) -> Result<(), SchemaBuildError>;
}

#[derive(Debug, Clone)]
pub struct Registry {
    output_types: HashMap<TableId, String>,
    connection_types: HashMap<TableId, String>,
    scalars: HashMap<String, String>,
    input_types: BTreeMap<String, InputObjectType>,
}

const DEFAULT_SCALARS: &[(&str, &str)] = &[
    ("int2", "Int"),
    ("int4", "Int"),
    ("int8", "BigInt"),
    ("float4", "Float"),
    ("float8", "Float"),
    ("numeric", "BigFloat"),
    ("bool", "Boolean"),
    ("text", "String"),
    ("varchar", "String"),
    ("bpchar", "String"),
    ("name", "String"),
    ("citext", "String"),
    ("uuid", "UUID"),
    ("date", "Date"),
    ("time", "Time"),
    ("timestamp", "Datetime"),
    ("timestamptz", "Datetime"),
    ("interval", "Interval"),
    ("json", "JSON"),
    ("jsonb", "JSON"),
];

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            output_types: HashMap::new(),
            connection_types: HashMap::new(),
            scalars: DEFAULT_SCALARS
                .iter()
                .map(|(pg, gql)| (pg.to_string(), gql.to_string()))
                .collect(),
            input_types: BTreeMap::new(),
        }
    }

    /// Registry with an output and a connection type for every selectable,
    /// non-omitted table of `catalogue`.
    pub fn for_catalogue(
        catalogue: &Catalogue,
        naming: &dyn NamingStrategy,
        omit: &dyn OmitPolicy,
    ) -> Self {
        let mut registry = Self::new();
        for table in catalogue.tables() {
            if !table.is_selectable
                || table.namespace.is_none()
                || omit.omit(Entity::Table(table), Action::Read)
            {
                log::debug!("No output type for {}", Entity::Table(table));
                continue;
            }
            let type_name = naming.table_type_name(table);
            let connection = naming.connection_type_name(&type_name);
            registry.register_table(table, type_name, connection);
        }
        registry
    }

    pub fn register_table(&mut self, table: &Table, type_name: String, connection_type: String) {
        self.output_types.insert(table.id, type_name);
        self.connection_types.insert(table.id, connection_type);
    }

    pub fn input_types(&self) -> impl Iterator<Item = &InputObjectType> {
        self.input_types.values()
    }

    pub fn into_input_types(self) -> BTreeMap<String, InputObjectType> {
        self.input_types
    }
}

impl TypeRegistry for Registry {
    fn table_output_type(&self, table: &Table) -> Option<String> {
        self.output_types.get(&table.id).cloned()
    }

    fn connection_type(&self, table: &Table) -> Option<String> {
        self.connection_types.get(&table.id).cloned()
    }

    fn attribute_input_type(&self, attr: &Attribute) -> Option<TypeRef> {
        self.scalars.get(&attr.type_name).map(TypeRef::named)
    }

    fn input_type(&self, name: &str) -> Option<&InputObjectType> {
        self.input_types.get(name)
    }

    fn register_input_type(&mut self, input_type: InputObjectType) -> Result<(), SchemaBuildError> {
        if self.input_types.contains_key(&input_type.name) {
            return Err(SchemaBuildError::DuplicateType {
                name: input_type.name,
            });
        }
        log::debug!("Registered input type {} ({})", input_type.name, input_type.origin);
        self.input_types.insert(input_type.name.clone(), input_type);
        Ok(())
    }
}
