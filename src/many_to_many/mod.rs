//! Many-to-many relation fields.
//!
//! [`ManyToManyPlugin`] infers the relations of every exposed table, registers
//! a condition input type per relation during the `types` stage and adds the
//! connection and/or simple collection fields during the `fields` stage.

pub mod assembler;
pub mod condition;
pub mod fields;

pub use condition::{apply_condition, condition_fields, condition_input_type, ConditionField};
pub use fields::{relation_fields, resolve_simple_collections, Cardinality, ManyToManyField, OutputColumn};

use crate::pg_catalog::{Action, Entity, Table};
use crate::relation_inference::{infer_many_to_many, RelationDescriptor};
use crate::schema::{BuildContext, FieldSpec, SchemaBuildError, SchemaPlugin, TypeRegistry};

#[derive(Debug, Clone, Copy, Default)]
pub struct ManyToManyPlugin;

/// Whether `table` gets an output type of its own
fn is_exposed(ctx: &BuildContext<'_>, table: &Table) -> bool {
    table.is_selectable
        && table.namespace.is_some()
        && !ctx.omit.omit(Entity::Table(table), Action::Read)
}

impl ManyToManyPlugin {
    /// Relations of `table` whose both ends are exposed. Empty when `table`
    /// itself is not exposed.
    fn relations(
        &self,
        ctx: &BuildContext<'_>,
        table: &Table,
    ) -> Result<Vec<RelationDescriptor>, SchemaBuildError> {
        if !is_exposed(ctx, table) {
            return Ok(Vec::new());
        }
        let mut relations = infer_many_to_many(table, ctx.catalogue, ctx.omit)?;
        relations.retain(|relation| {
            let exposed = is_exposed(ctx, relation.right_table());
            if !exposed {
                log::debug!(
                    "Skipping many-to-many relation from {} through {}: {} has no output type",
                    Entity::Table(table),
                    Entity::Table(relation.junction_table()),
                    Entity::Table(relation.right_table())
                );
            }
            exposed
        });
        Ok(relations)
    }
}

impl SchemaPlugin for ManyToManyPlugin {
    fn name(&self) -> &'static str {
        "ManyToManyRelation"
    }

    fn contribute_types(
        &self,
        ctx: &BuildContext<'_>,
        registry: &mut dyn TypeRegistry,
    ) -> Result<(), SchemaBuildError> {
        for table in ctx.catalogue.tables() {
            // condition types only; the fields are still added without one
            if ctx.omit.omit(Entity::Table(table), Action::Filter) {
                continue;
            }
            for relation in self.relations(ctx, table)? {
                let fields = condition_fields(&relation, ctx, registry);
                if let Some(input_type) = condition_input_type(&relation, ctx, &fields) {
                    registry.register_input_type(input_type)?;
                }
            }
        }
        Ok(())
    }

    fn contribute_fields(
        &self,
        ctx: &BuildContext<'_>,
        table: &Table,
        registry: &dyn TypeRegistry,
    ) -> Result<Vec<FieldSpec>, SchemaBuildError> {
        let mut fields = Vec::new();
        for relation in self.relations(ctx, table)? {
            fields.extend(relation_fields(ctx, registry, relation)?);
        }
        if !fields.is_empty() {
            log::info!(
                "Adding {} many-to-many field(s) to {}",
                fields.len(),
                Entity::Table(table)
            );
        }
        Ok(fields)
    }
}
