//! Filtering a many-to-many field by the junction table's own columns.
//!
//! For `posts <- posts_tags(post_id, tag_id, created_at, weight) -> tags` the
//! `tags` field of a post accepts `condition: { createdAt, weight }`. The
//! junction key columns are never offered: they are already pinned by the
//! joins.

use serde_json::{Map, Value};

use crate::pg_catalog::{Action, Attribute, Entity};
use crate::relation_inference::RelationDescriptor;
use crate::schema::{BuildContext, InputField, InputObjectType, TypeRef, TypeRegistry};
use crate::sql::{Fragment, QueryBuilder, QueryError};

/// One filterable junction column
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionField {
    /// Key used in the `condition` argument
    pub name: String,
    pub attribute: Attribute,
    pub ty: TypeRef,
}

/// Junction columns a relation can be filtered by, in column order.
///
/// Columns without a mapped input type fall back to `String`.
pub fn condition_fields(
    relation: &RelationDescriptor,
    ctx: &BuildContext<'_>,
    registry: &dyn TypeRegistry,
) -> Vec<ConditionField> {
    relation
        .junction_table()
        .attributes
        .iter()
        .filter(|attr| !relation.is_junction_key(attr))
        .filter(|attr| !ctx.omit.omit(Entity::Attribute(attr), Action::Filter))
        .map(|attr| ConditionField {
            name: ctx.naming.column_name(attr),
            attribute: attr.clone(),
            ty: registry
                .attribute_input_type(attr)
                .unwrap_or_else(|| TypeRef::named("String")),
        })
        .collect()
}

/// The condition input type for a relation, or `None` when nothing is
/// filterable (such a type would have no fields).
pub fn condition_input_type(
    relation: &RelationDescriptor,
    ctx: &BuildContext<'_>,
    fields: &[ConditionField],
) -> Option<InputObjectType> {
    if fields.is_empty() {
        return None;
    }
    let relation_name = ctx.naming.relation_field_name(relation);
    let right_type = ctx.naming.table_type_name(relation.right_table());
    Some(InputObjectType {
        name: ctx.naming.condition_type_name(&relation_name),
        description: Some(format!(
            "A condition to be used against many-to-many `{}` object types. All fields are tested for equality and combined with a logical 'and'.",
            right_type
        )),
        fields: fields
            .iter()
            .map(|f| InputField {
                name: f.name.clone(),
                description: Some(format!("Checks for equality with the object's `{}` field.", f.name)),
                ty: f.ty.clone(),
            })
            .collect(),
        origin: format!(
            "Adding condition type for {}. You can rename the table's GraphQL type via a 'Smart Comment'",
            Entity::Table(relation.junction_table())
        ),
    })
}

/// Add one predicate per condition key to `builder`.
///
/// A value compares with `=`, an explicit `null` becomes `IS NULL` and a
/// missing key adds nothing. `field_name` is only used in error messages.
pub fn apply_condition(
    builder: &mut QueryBuilder,
    field_name: &str,
    fields: &[ConditionField],
    condition: &Map<String, Value>,
) -> Result<(), QueryError> {
    let junction_alias = builder
        .junction_table_alias()
        .cloned()
        .ok_or_else(|| QueryError::MissingJunctionAlias {
            field: field_name.to_string(),
        })?;

    if let Some(unknown) = condition
        .keys()
        .find(|key| !fields.iter().any(|f| &f.name == *key))
    {
        return Err(QueryError::UnknownConditionField {
            field: field_name.to_string(),
            name: unknown.clone(),
        });
    }

    for field in fields {
        let column = Fragment::column(&junction_alias, &field.attribute.name);
        match condition.get(&field.name) {
            Some(Value::Null) => builder.add_filter(column.append_raw(" IS NULL")),
            Some(value) => builder.add_filter(Fragment::eq(
                column,
                Fragment::value(value.clone(), field.attribute.type_name.clone()),
            )),
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::pg_catalog::testing::*;
    use crate::pg_catalog::{AllowAll, Catalogue, OmitPolicy, TableId};
    use crate::relation_inference::infer_many_to_many;
    use crate::schema::Registry;
    use crate::sql::{Alias, ToSql};
    use crate::utils::DefaultInflector;
    use serde_json::json;

    fn posts_relation(catalogue: &Catalogue) -> RelationDescriptor {
        let posts = catalogue.table(TableId(POSTS)).unwrap();
        infer_many_to_many(posts, catalogue, &AllowAll).unwrap().remove(0)
    }

    fn fields_with(catalogue: &Catalogue, omit: &dyn OmitPolicy) -> Vec<ConditionField> {
        let config = SchemaConfig::default();
        let ctx = BuildContext {
            catalogue,
            omit,
            naming: &DefaultInflector,
            config: &config,
        };
        let registry = Registry::new();
        condition_fields(&posts_relation(catalogue), &ctx, &registry)
    }

    fn builder_with_junction() -> QueryBuilder {
        let mut qb = QueryBuilder::new(Fragment::identifier(&["public", "tags"]), Alias::new("r"));
        qb.set_junction_table_alias(Alias::new("j"));
        qb
    }

    #[test]
    fn test_only_non_key_junction_columns_are_filterable() {
        let catalogue = blog_catalogue();
        let fields = fields_with(&catalogue, &AllowAll);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["createdAt", "weight"]);
        assert_eq!(fields[0].ty, TypeRef::named("Datetime"));
        assert_eq!(fields[1].ty, TypeRef::named("Int"));
    }

    #[test]
    fn test_filter_omitted_columns_are_dropped() {
        let catalogue = blog_catalogue();
        let hide_weight = |entity: Entity<'_>, action: Action| {
            action == Action::Filter && matches!(entity, Entity::Attribute(a) if a.name == "weight")
        };
        let fields = fields_with(&catalogue, &hide_weight);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "createdAt");
    }

    #[test]
    fn test_unmapped_type_falls_back_to_string() {
        let mut junction = posts_tags_table();
        junction.attributes.push(crate::pg_catalog::Attribute::new(5, "shape", "geometry"));
        let catalogue =
            Catalogue::new(vec![posts_table(), tags_table(), junction], blog_constraints()).unwrap();
        let fields = fields_with(&catalogue, &AllowAll);
        assert_eq!(fields.last().unwrap().ty, TypeRef::named("String"));
    }

    #[test]
    fn test_no_input_type_without_fields() {
        let catalogue = blog_catalogue();
        let config = SchemaConfig::default();
        let ctx = BuildContext {
            catalogue: &catalogue,
            omit: &AllowAll,
            naming: &DefaultInflector,
            config: &config,
        };
        let relation = posts_relation(&catalogue);
        assert!(condition_input_type(&relation, &ctx, &[]).is_none());

        let fields = condition_fields(&relation, &ctx, &Registry::new());
        let input = condition_input_type(&relation, &ctx, &fields).unwrap();
        assert_eq!(input.name, "TagsByPostsTagPostIdAndTagIdCondition");
        assert!(input.field("weight").is_some());
        assert!(input.field("postId").is_none());
        assert!(input
            .description
            .as_deref()
            .unwrap()
            .ends_with("combined with a logical 'and'."));
        assert_eq!(
            input.field("weight").unwrap().description.as_deref(),
            Some("Checks for equality with the object's `weight` field.")
        );
    }

    #[test]
    fn test_value_null_and_absent_keys() {
        let catalogue = blog_catalogue();
        let fields = fields_with(&catalogue, &AllowAll);
        let mut qb = builder_with_junction();
        let condition = json!({"weight": 5, "createdAt": null});

        apply_condition(&mut qb, "tags", &fields, condition.as_object().unwrap()).unwrap();

        let rendered: Vec<String> = qb.filters().iter().map(|f| f.to_sql()).collect();
        assert_eq!(
            rendered,
            vec![r#""j"."created_at" IS NULL"#, r#""j"."weight" = $1::int4"#]
        );
        assert_eq!(qb.filters()[1].compile().values, vec![json!(5)]);
    }

    #[test]
    fn test_empty_condition_adds_nothing() {
        let catalogue = blog_catalogue();
        let fields = fields_with(&catalogue, &AllowAll);
        let mut qb = builder_with_junction();
        apply_condition(&mut qb, "tags", &fields, &Map::new()).unwrap();
        assert!(qb.filters().is_empty());
    }

    #[test]
    fn test_missing_junction_alias_is_an_error() {
        let catalogue = blog_catalogue();
        let fields = fields_with(&catalogue, &AllowAll);
        let mut qb = QueryBuilder::new(Fragment::identifier(&["tags"]), Alias::new("r"));
        let err = apply_condition(&mut qb, "tags", &fields, &Map::new()).unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingJunctionAlias {
                field: "tags".to_string()
            }
        );
    }

    #[test]
    fn test_key_columns_cannot_be_used_as_condition() {
        let catalogue = blog_catalogue();
        let fields = fields_with(&catalogue, &AllowAll);
        let mut qb = builder_with_junction();
        let condition = json!({"postId": 1});
        let err = apply_condition(&mut qb, "tags", &fields, condition.as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownConditionField { ref name, .. } if name == "postId"));
        assert!(qb.filters().is_empty());
    }
}
