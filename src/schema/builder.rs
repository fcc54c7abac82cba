//! Plugin pipeline that turns a catalogue into a [`Schema`].
//!
//! The build runs in two stages. During `types` every plugin may register
//! input types; during `fields` every plugin is asked, table by table, for the
//! fields it adds to that table's output type. The resulting schema is
//! immutable and can be shared across threads.

use std::collections::BTreeMap;
use std::fmt;

use super::errors::SchemaBuildError;
use super::field::FieldSpec;
use super::registry::{InputObjectType, Registry, TypeRegistry};
use crate::config::SchemaConfig;
use crate::pg_catalog::{Catalogue, OmitPolicy, Table, TableId, TagOmitPolicy};
use crate::utils::{DefaultInflector, NamingStrategy};

/// Everything a plugin may consult while contributing to the schema
pub struct BuildContext<'a> {
    pub catalogue: &'a Catalogue,
    pub omit: &'a dyn OmitPolicy,
    pub naming: &'a dyn NamingStrategy,
    pub config: &'a SchemaConfig,
}

pub trait SchemaPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn contribute_types(
        &self,
        _ctx: &BuildContext<'_>,
        _registry: &mut dyn TypeRegistry,
    ) -> Result<(), SchemaBuildError> {
        Ok(())
    }

    fn contribute_fields(
        &self,
        _ctx: &BuildContext<'_>,
        _table: &Table,
        _registry: &dyn TypeRegistry,
    ) -> Result<Vec<FieldSpec>, SchemaBuildError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Types,
    Fields,
}

impl Stage {
    pub const ORDER: [Stage; 2] = [Stage::Types, Stage::Fields];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Types => f.write_str("types"),
            Stage::Fields => f.write_str("fields"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub table_id: TableId,
    pub fields: Vec<FieldSpec>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn add_field(&mut self, field: FieldSpec) -> Result<(), SchemaBuildError> {
        if self.field(&field.name).is_some() {
            return Err(SchemaBuildError::DuplicateField {
                type_name: self.name.clone(),
                field: field.name,
                origin: field.origin,
            });
        }
        self.fields.push(field);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    object_types: BTreeMap<String, ObjectType>,
    input_types: BTreeMap<String, InputObjectType>,
}

impl Schema {
    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.object_types.get(name)
    }

    pub fn object_types(&self) -> impl Iterator<Item = &ObjectType> {
        self.object_types.values()
    }

    pub fn input_type(&self, name: &str) -> Option<&InputObjectType> {
        self.input_types.get(name)
    }

    pub fn input_types(&self) -> impl Iterator<Item = &InputObjectType> {
        self.input_types.values()
    }
}

pub struct SchemaBuilder<'a> {
    catalogue: &'a Catalogue,
    config: SchemaConfig,
    omit: Box<dyn OmitPolicy + 'a>,
    naming: Box<dyn NamingStrategy + 'a>,
    plugins: Vec<Box<dyn SchemaPlugin + 'a>>,
}

impl<'a> SchemaBuilder<'a> {
    /// Builder with the tag-driven omit policy, the default inflector and
    /// default configuration.
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            catalogue,
            config: SchemaConfig::default(),
            omit: Box::new(TagOmitPolicy),
            naming: Box::new(DefaultInflector),
            plugins: Vec::new(),
        }
    }

    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn omit_policy(mut self, omit: impl OmitPolicy + 'a) -> Self {
        self.omit = Box::new(omit);
        self
    }

    pub fn naming(mut self, naming: impl NamingStrategy + 'a) -> Self {
        self.naming = Box::new(naming);
        self
    }

    pub fn plugin(mut self, plugin: impl SchemaPlugin + 'a) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaBuildError> {
        let ctx = BuildContext {
            catalogue: self.catalogue,
            omit: self.omit.as_ref(),
            naming: self.naming.as_ref(),
            config: &self.config,
        };
        let mut registry = Registry::for_catalogue(self.catalogue, ctx.naming, ctx.omit);
        let mut object_types = BTreeMap::new();

        for stage in Stage::ORDER {
            log::debug!("Running schema stage `{}`", stage);
            match stage {
                Stage::Types => {
                    for plugin in &self.plugins {
                        plugin.contribute_types(&ctx, &mut registry)?;
                    }
                }
                Stage::Fields => {
                    for table in self.catalogue.tables() {
                        let Some(type_name) = registry.table_output_type(table) else {
                            continue;
                        };
                        let mut object = ObjectType {
                            name: type_name.clone(),
                            table_id: table.id,
                            fields: Vec::new(),
                        };
                        for plugin in &self.plugins {
                            for field in plugin.contribute_fields(&ctx, table, &registry)? {
                                object.add_field(field)?;
                            }
                        }
                        object_types.insert(type_name, object);
                    }
                }
            }
        }

        let schema = Schema {
            object_types,
            input_types: registry.into_input_types(),
        };
        log::info!(
            "Built schema: {} object type(s), {} input type(s), {} plugin(s)",
            schema.object_types.len(),
            schema.input_types.len(),
            self.plugins.len()
        );
        Ok(schema)
    }
}
