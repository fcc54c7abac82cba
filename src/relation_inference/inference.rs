//! Many-to-many relation inference.
//!
//! Starting from a left table, every incoming foreign key is treated as the
//! left half of a potential junction. The junction table's other foreign key
//! (the first one, in catalogue order, that does not point back at the left
//! table) supplies the right half.
//!
//! ```text
//!   posts (id)  <--post_id--  posts_tags  --tag_id-->  tags (id)
//!   ^ left                    ^ junction               ^ right
//! ```
//!
//! Candidates that are not genuine many-to-many relations are skipped
//! silently; only catalogue inconsistencies are reported as errors.

use std::collections::BTreeSet;

use super::descriptor::{RelationDescriptor, RelationKeys};
use crate::pg_catalog::{Action, Attribute, CatalogError, Catalogue, Constraint, Entity, OmitPolicy, Table};

/// Infer the many-to-many relations reachable from `left_table`.
///
/// Pure: the same catalogue and policy always yield the same descriptors in
/// the same order (the catalogue order of the junction-left constraints).
pub fn infer_many_to_many(
    left_table: &Table,
    catalogue: &Catalogue,
    omit: &dyn OmitPolicy,
) -> Result<Vec<RelationDescriptor>, CatalogError> {
    let mut relations = Vec::new();

    for junction_left_constraint in catalogue.foreign_constraints_referencing(left_table.id) {
        if omit.omit(Entity::Constraint(junction_left_constraint), Action::Read) {
            continue;
        }
        if let Some(descriptor) =
            infer_from_constraint(left_table, junction_left_constraint, catalogue, omit)?
        {
            relations.push(descriptor);
        }
    }

    log::debug!(
        "Inferred {} many-to-many relation(s) for {}",
        relations.len(),
        Entity::Table(left_table)
    );
    Ok(relations)
}

fn infer_from_constraint(
    left_table: &Table,
    junction_left_constraint: &Constraint,
    catalogue: &Catalogue,
    omit: &dyn OmitPolicy,
) -> Result<Option<RelationDescriptor>, CatalogError> {
    let junction_table = catalogue
        .table(junction_left_constraint.table_id)
        .ok_or_else(|| CatalogError::MissingJunctionTable {
            constraint: junction_left_constraint.name.clone(),
            table_id: junction_left_constraint.table_id.0,
        })?;

    let Some((junction_right_constraint, right_table_id)) = catalogue
        .constraints_on(junction_table.id)
        .filter_map(|con| con.foreign_table_id().map(|target| (con, target)))
        .find(|(_, target)| *target != left_table.id)
    else {
        log::debug!(
            "Skipping {}: {} has no second foreign key",
            Entity::Constraint(junction_left_constraint),
            Entity::Table(junction_table)
        );
        return Ok(None);
    };

    let right_table =
        catalogue
            .table(right_table_id)
            .ok_or_else(|| CatalogError::MissingForeignTable {
                constraint: junction_right_constraint.name.clone(),
                table_id: right_table_id.0,
            })?;

    let keys = resolve_keys(
        catalogue,
        left_table,
        junction_table,
        right_table,
        junction_left_constraint,
        junction_right_constraint,
    )?;

    if let Some(hidden) = keys
        .all()
        .find(|attr| omit.omit(Entity::Attribute(attr), Action::Read))
    {
        log::debug!(
            "Skipping {}: key {} is not readable",
            Entity::Constraint(junction_left_constraint),
            Entity::Attribute(hidden)
        );
        return Ok(None);
    }

    // TODO: composite keys need a multi-column join condition and cursor layout
    if !keys.is_single_column() {
        log::debug!(
            "Skipping {}: multi-column keys are not supported",
            Entity::Constraint(junction_left_constraint)
        );
        return Ok(None);
    }

    if is_unique_on(catalogue, junction_table, &keys.junction_left)
        || is_unique_on(catalogue, junction_table, &keys.junction_right)
    {
        log::debug!(
            "Skipping {}: junction keys are unique on {} (one-to-one)",
            Entity::Constraint(junction_left_constraint),
            Entity::Table(junction_table)
        );
        return Ok(None);
    }

    Ok(Some(RelationDescriptor::new(
        left_table,
        junction_table,
        right_table,
        junction_left_constraint,
        junction_right_constraint,
        keys,
    )))
}

fn resolve_keys(
    catalogue: &Catalogue,
    left_table: &Table,
    junction_table: &Table,
    right_table: &Table,
    junction_left_constraint: &Constraint,
    junction_right_constraint: &Constraint,
) -> Result<RelationKeys, CatalogError> {
    let keys = RelationKeys {
        left: catalogue.resolve_attributes(
            left_table,
            junction_left_constraint.foreign_key_attribute_nums(),
            junction_left_constraint,
        )?,
        junction_left: catalogue.resolve_attributes(
            junction_table,
            junction_left_constraint.key_attribute_nums(),
            junction_left_constraint,
        )?,
        junction_right: catalogue.resolve_attributes(
            junction_table,
            junction_right_constraint.key_attribute_nums(),
            junction_right_constraint,
        )?,
        right: catalogue.resolve_attributes(
            right_table,
            junction_right_constraint.foreign_key_attribute_nums(),
            junction_right_constraint,
        )?,
    };

    for (constraint, local, foreign) in [
        (junction_left_constraint, &keys.junction_left, &keys.left),
        (junction_right_constraint, &keys.junction_right, &keys.right),
    ] {
        if local.is_empty() || foreign.is_empty() {
            return Err(CatalogError::EmptyForeignKey {
                constraint: constraint.name.clone(),
            });
        }
    }

    Ok(keys)
}

/// Whether `columns` exactly match a primary key or unique constraint on `table`
fn is_unique_on(catalogue: &Catalogue, table: &Table, columns: &[Attribute]) -> bool {
    let wanted: BTreeSet<i16> = columns.iter().map(|attr| attr.num).collect();
    catalogue
        .constraints_on(table.id)
        .filter(|con| con.is_unique_key())
        .any(|con| con.key_attribute_nums().iter().copied().collect::<BTreeSet<_>>() == wanted)
}
