//! Field definitions for inferred many-to-many relations.

use std::sync::Arc;

use serde_json::Value;

use super::assembler;
use super::condition::{self, ConditionField};
use crate::config::SimpleCollections;
use crate::pg_catalog::{Action, Attribute, Entity};
use crate::relation_inference::RelationDescriptor;
use crate::schema::{
    ArgSpec, BuildContext, FieldArgs, FieldResolver, FieldSpec, SchemaBuildError, TypeRef,
    TypeRegistry,
};
use crate::sql::{add_start_end_cursor, Fragment, QueryBuilder, QueryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Paginated set with cursors and page info
    Connection,
    /// Plain JSON array of every related row
    SimpleCollection,
}

/// A readable right-table column and the key it is exposed under
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub name: String,
    pub attribute: Attribute,
}

/// Resolver for one many-to-many field. Holds everything fixed at build time.
#[derive(Debug)]
pub struct ManyToManyField {
    pub(crate) name: String,
    pub(crate) cardinality: Cardinality,
    pub(crate) relation: Arc<RelationDescriptor>,
    pub(crate) output_columns: Vec<OutputColumn>,
    pub(crate) primary_key: Option<Vec<Attribute>>,
    pub(crate) unique_keys: Vec<Vec<Attribute>>,
    pub(crate) condition_fields: Arc<Vec<ConditionField>>,
    pub(crate) max_page_size: u32,
}

impl ManyToManyField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn relation(&self) -> &RelationDescriptor {
        &self.relation
    }

    pub fn condition_fields(&self) -> &[ConditionField] {
        &self.condition_fields
    }

    pub(crate) fn output_column(&self, name: &str) -> Result<&OutputColumn, QueryError> {
        self.output_columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| QueryError::UnknownColumn {
                table: self.relation.right_table().name.clone(),
                column: name.to_string(),
            })
    }

    /// The requested columns, or every readable column when none are requested
    pub(crate) fn selected_columns(&self, requested: &[String]) -> Result<Vec<&OutputColumn>, QueryError> {
        if requested.is_empty() {
            return Ok(self.output_columns.iter().collect());
        }
        requested.iter().map(|name| self.output_column(name)).collect()
    }

    /// Whether ordering by `columns` already identifies a single row
    pub(crate) fn is_unique_ordering(&self, columns: &[&Attribute]) -> bool {
        self.unique_keys.iter().any(|key| {
            !key.is_empty()
                && key
                    .iter()
                    .all(|k| columns.iter().any(|c| c.num == k.num))
        })
    }
}

impl FieldResolver for ManyToManyField {
    fn select(&self, parent: &QueryBuilder, args: &FieldArgs) -> Result<Fragment, QueryError> {
        assembler::assemble(self, parent, args)
    }

    fn shape(&self, raw: Value) -> Value {
        match self.cardinality {
            Cardinality::Connection => add_start_end_cursor(raw),
            Cardinality::SimpleCollection => raw,
        }
    }
}

/// Which collection fields a relation exposes: the junction-right
/// constraint's tag wins over the right table's tag, which wins over config.
pub fn resolve_simple_collections(
    relation: &RelationDescriptor,
    config_default: SimpleCollections,
) -> SimpleCollections {
    relation
        .junction_right_constraint()
        .tags
        .simple_collections()
        .or_else(|| relation.right_table().tags.simple_collections())
        .unwrap_or(config_default)
}

/// Build the connection and/or simple collection fields for one relation.
pub fn relation_fields(
    ctx: &BuildContext<'_>,
    registry: &dyn TypeRegistry,
    relation: RelationDescriptor,
) -> Result<Vec<FieldSpec>, SchemaBuildError> {
    let right_table = relation.right_table();
    let origin_of = |cardinality: &str| {
        format!(
            "Many-to-many relation ({}) for {} and {}.",
            cardinality,
            Entity::Constraint(relation.junction_left_constraint()),
            Entity::Constraint(relation.junction_right_constraint())
        )
    };

    let right_type = registry
        .table_output_type(right_table)
        .ok_or_else(|| SchemaBuildError::UnresolvedOutputType {
            table: Entity::Table(right_table).to_string(),
            origin: origin_of("field"),
        })?;

    let mode = resolve_simple_collections(&relation, ctx.config.simple_collections);
    let relation_name = ctx.naming.relation_field_name(&relation);

    let condition_type = registry
        .input_type(&ctx.naming.condition_type_name(&relation_name))
        .map(|t| t.name.clone());
    // without a registered type the field takes no condition at all
    let condition_fields = if condition_type.is_some() {
        condition::condition_fields(&relation, ctx, registry)
    } else {
        Vec::new()
    };

    let output_columns: Vec<OutputColumn> = right_table
        .attributes
        .iter()
        .filter(|attr| !ctx.omit.omit(Entity::Attribute(attr), Action::Read))
        .map(|attr| OutputColumn {
            name: ctx.naming.column_name(attr),
            attribute: attr.clone(),
        })
        .collect();
    let primary_key = ctx.catalogue.primary_key_attributes(right_table)?;
    let unique_keys = ctx
        .catalogue
        .constraints_on(right_table.id)
        .filter(|con| con.is_unique_key())
        .map(|con| ctx.catalogue.resolve_attributes(right_table, con.key_attribute_nums(), con))
        .collect::<Result<Vec<_>, _>>()?;

    let description = format!("Reads and enables pagination through a set of `{}`.", right_type);
    let mut common_args = Vec::new();
    if let Some(condition_type) = &condition_type {
        common_args.push(
            ArgSpec::new("condition", TypeRef::named(condition_type.clone())).with_description(
                "A condition to be used in determining which values should be returned by the collection.",
            ),
        );
    }
    common_args.push(
        ArgSpec::new(
            "orderBy",
            TypeRef::named(ctx.naming.order_by_type_name(&right_type))
                .non_null()
                .list(),
        )
        .with_description("The method to use when ordering the collection."),
    );

    let connection_origin = origin_of("connection");
    let simple_origin = origin_of("simple collection");
    let relation = Arc::new(relation);
    let condition_fields = Arc::new(condition_fields);
    let resolver = |name: String, cardinality: Cardinality| ManyToManyField {
        name,
        cardinality,
        relation: Arc::clone(&relation),
        output_columns: output_columns.clone(),
        primary_key: primary_key.clone(),
        unique_keys: unique_keys.clone(),
        condition_fields: Arc::clone(&condition_fields),
        max_page_size: ctx.config.max_page_size,
    };

    let mut fields = Vec::new();
    if mode.has_connections() {
        let connection_type = registry.connection_type(relation.right_table()).ok_or_else(|| {
            SchemaBuildError::UnresolvedConnectionType {
                table: Entity::Table(relation.right_table()).to_string(),
                origin: connection_origin.clone(),
            }
        })?;
        let mut args = common_args.clone();
        args.extend([
            ArgSpec::new("first", TypeRef::named("Int"))
                .with_description("Only read the first `n` values of the set."),
            ArgSpec::new("offset", TypeRef::named("Int")).with_description(
                "Skip the first `n` values from our `after` cursor, an alternative to cursor based pagination.",
            ),
            ArgSpec::new("before", TypeRef::named("Cursor"))
                .with_description("Read all values in the set before (above) this cursor."),
            ArgSpec::new("after", TypeRef::named("Cursor"))
                .with_description("Read all values in the set after (below) this cursor."),
        ]);
        fields.push(FieldSpec {
            name: relation_name.clone(),
            description: Some(description.clone()),
            ty: TypeRef::named(connection_type).non_null(),
            args,
            resolver: Arc::new(resolver(relation_name.clone(), Cardinality::Connection)),
            origin: connection_origin,
        });
    }
    if mode.has_simple_collections() {
        let simple_name = ctx.naming.relation_field_name_simple(&relation);
        fields.push(FieldSpec {
            name: simple_name.clone(),
            description: Some(description),
            ty: TypeRef::named(right_type.clone()).non_null().list().non_null(),
            args: common_args,
            resolver: Arc::new(resolver(simple_name, Cardinality::SimpleCollection)),
            origin: simple_origin,
        });
    }
    Ok(fields)
}
