//! SQL for one many-to-many field, evaluated as a correlated subquery of the
//! parent row's query.
//!
//! ```text
//! (SELECT ...
//!  FROM right AS r
//!  INNER JOIN junction AS j ON (r.rk = j.jrk)
//!  INNER JOIN left AS l ON (l.lk = j.jlk AND l.lk = <parent>.lk)
//!  WHERE <condition> AND <cursor>
//!  ORDER BY <explicit>, <primary key>)
//! ```
//!
//! Every alias comes from an [`AliasAllocator`] that avoids the aliases visible
//! from the parent, so the left table gets its own instance and correlates
//! with the parent row explicitly.

use super::condition::apply_condition;
use super::fields::{Cardinality, ManyToManyField};
use crate::pg_catalog::{Attribute, Entity};
use crate::schema::{FieldArgs, OrderSpec};
use crate::sql::cursor::NODE_CURSOR_KEY;
use crate::sql::{
    json_build_object, Cursor, Fragment, Join, OrderDirection, QueryBuilder, QueryError,
};
use crate::utils::AliasAllocator;

const PRIMARY_KEY_ASC: &str = "primary_key_asc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorSide {
    After,
    Before,
}

pub(crate) fn assemble(
    field: &ManyToManyField,
    parent: &QueryBuilder,
    args: &FieldArgs,
) -> Result<Fragment, QueryError> {
    let relation = field.relation();
    let mut aliases = AliasAllocator::avoiding(&parent.visible_aliases());
    let right_alias = aliases.fresh("m2m_right");
    let junction_alias = aliases.fresh("m2m_junction");
    let left_alias = aliases.fresh("m2m_left");

    let mut inner = QueryBuilder::nested(
        Fragment::table(relation.right_table()),
        right_alias.clone(),
        parent,
    );
    inner.join(Join::inner(
        Fragment::table(relation.junction_table()),
        junction_alias.clone(),
        vec![Fragment::eq(
            Fragment::column(&right_alias, &relation.right_key().name),
            Fragment::column(&junction_alias, &relation.junction_right_key().name),
        )],
    ));
    let left_key = &relation.left_key().name;
    inner.join(Join::inner(
        Fragment::table(relation.left_table()),
        left_alias.clone(),
        vec![
            Fragment::eq(
                Fragment::column(&left_alias, left_key),
                Fragment::column(&junction_alias, &relation.junction_left_key().name),
            ),
            Fragment::eq(
                Fragment::column(&left_alias, left_key),
                Fragment::column(parent.table_alias(), left_key),
            ),
        ],
    ));
    inner.set_junction_table_alias(junction_alias);

    if let Some(condition) = &args.condition {
        apply_condition(&mut inner, field.name(), field.condition_fields(), condition)?;
    }

    for column in field.selected_columns(&args.columns)? {
        inner.select(
            Fragment::column(&right_alias, &column.attribute.name),
            column.name.clone(),
        );
    }

    let ordering = apply_ordering(&mut inner, field, &args.order_by)?;

    let sql = match field.cardinality() {
        Cardinality::SimpleCollection => simple_collection(&inner),
        Cardinality::Connection => connection(&mut inner, field, args, &ordering, &mut aliases)?,
    };
    log::debug!(
        "Assembled `{}` through {} ({} filter(s), {} ordering column(s))",
        field.name(),
        Entity::Table(relation.junction_table()),
        inner.filters().len(),
        ordering.len()
    );
    Ok(sql.parens())
}

/// Apply the requested ordering, then fall back to the primary key when the
/// ordering does not already identify a single row.
fn apply_ordering(
    inner: &mut QueryBuilder,
    field: &ManyToManyField,
    order_by: &[OrderSpec],
) -> Result<Vec<(Attribute, OrderDirection)>, QueryError> {
    let alias = inner.table_alias().clone();
    let mut ordering: Vec<(Attribute, OrderDirection)> = Vec::new();

    for spec in order_by {
        let column = field.output_column(&spec.column)?;
        inner.order_by(Fragment::column(&alias, &column.attribute.name), spec.direction);
        inner.push_cursor_prefix(format!("{}_{}", column.attribute.name, spec.direction.as_str()));
        ordering.push((column.attribute.clone(), spec.direction));
    }

    let ordered: Vec<&Attribute> = ordering.iter().map(|(attr, _)| attr).collect();
    if field.is_unique_ordering(&ordered) {
        inner.set_order_is_unique();
    }

    if !inner.is_order_unique() {
        if let Some(primary_key) = &field.primary_key {
            inner.push_cursor_prefix(PRIMARY_KEY_ASC);
            for attr in primary_key {
                inner.order_by(Fragment::column(&alias, &attr.name), OrderDirection::Asc);
                ordering.push((attr.clone(), OrderDirection::Asc));
            }
            inner.set_order_is_unique();
        }
    }
    Ok(ordering)
}

fn simple_collection(inner: &QueryBuilder) -> Fragment {
    let mut aggregate = Fragment::raw("coalesce(json_agg(").append(inner.json_object());
    if !inner.order_by_items().is_empty() {
        aggregate.push_raw(" ORDER BY ");
        aggregate.push(inner.order_by_list());
    }
    aggregate.push_raw("), '[]'::json)");

    Fragment::raw("SELECT ")
        .append(aggregate)
        .append_raw("\n")
        .append(inner.source_clauses())
}

fn connection(
    inner: &mut QueryBuilder,
    field: &ManyToManyField,
    args: &FieldArgs,
    ordering: &[(Attribute, OrderDirection)],
    aliases: &mut AliasAllocator,
) -> Result<Fragment, QueryError> {
    if let Some(after) = &args.after {
        add_cursor_filter(inner, ordering, after, CursorSide::After)?;
    }
    if let Some(before) = &args.before {
        add_cursor_filter(inner, ordering, before, CursorSide::Before)?;
    }

    let max_page_size = u64::from(field.max_page_size);
    let page_size = args.first.unwrap_or(max_page_size).min(max_page_size);
    let offset = args.offset.unwrap_or(0);
    // one extra row tells us whether there is a next page
    inner.set_limit(page_size + 1);
    if offset > 0 {
        inner.set_offset(offset);
    }

    let right_alias = inner.table_alias().clone();
    let prefix = inner
        .cursor_prefix()
        .iter()
        .map(|tag| Fragment::literal(tag));
    let values = Fragment::raw("json_build_array(")
        .append(Fragment::join(
            ordering
                .iter()
                .map(|(attr, _)| Fragment::column(&right_alias, &attr.name)),
            ", ",
        ))
        .append_raw(")");
    let cursor = Fragment::raw("json_build_array(")
        .append(Fragment::join(prefix.chain(std::iter::once(values)), ", "))
        .append_raw(")");
    let node = json_build_object(
        std::iter::once((NODE_CURSOR_KEY, cursor)).chain(
            inner
                .select_items()
                .iter()
                .map(|item| (item.col_alias.as_str(), item.expression.clone())),
        ),
    );

    let mut row_number = Fragment::raw("row_number() OVER (");
    if !inner.order_by_items().is_empty() {
        row_number.push_raw("ORDER BY ");
        row_number.push(inner.order_by_list());
    }
    row_number.push_raw(")");

    let rows = Fragment::raw("SELECT ")
        .append(node)
        .append_raw(" AS \"node\", ")
        .append(row_number)
        .append_raw(" AS \"n\"\n")
        .append(inner.source_clauses())
        .append(inner.order_by_clause())
        .append(inner.limit_clause());

    let page_alias = aliases.fresh("m2m_page");
    let node_column = Fragment::column(&page_alias, "node");
    let n_column = Fragment::column(&page_alias, "n");
    let data = Fragment::raw("coalesce(json_agg(")
        .append(node_column)
        .append_raw(" ORDER BY ")
        .append(n_column.clone())
        .append_raw(") FILTER (WHERE ")
        .append(n_column)
        .append_raw(&format!(" <= {}), '[]'::json)", offset.saturating_add(page_size)));
    let has_previous_page = offset > 0 || args.after.is_some();
    let page = json_build_object([
        ("data", data),
        ("hasNextPage", Fragment::raw(format!("count(*) > {}", page_size))),
        ("hasPreviousPage", Fragment::raw(has_previous_page.to_string())),
    ]);

    Ok(Fragment::raw("SELECT ")
        .append(page)
        .append_raw("\nFROM (")
        .append(rows)
        .append_raw(") AS ")
        .append(Fragment::alias(&page_alias)))
}

/// Restrict rows to those strictly after (or before) the cursor position,
/// comparing the ordering columns lexicographically.
fn add_cursor_filter(
    inner: &mut QueryBuilder,
    ordering: &[(Attribute, OrderDirection)],
    encoded: &str,
    side: CursorSide,
) -> Result<(), QueryError> {
    let cursor = Cursor::decode(encoded)?;
    if cursor.prefix.as_slice() != inner.cursor_prefix() {
        return Err(QueryError::CursorOrderingMismatch {
            expected: inner.cursor_prefix().to_vec(),
            found: cursor.prefix,
        });
    }
    if cursor.values.len() != ordering.len() {
        return Err(QueryError::InvalidCursor(format!(
            "expected {} ordering value(s), found {}",
            ordering.len(),
            cursor.values.len()
        )));
    }
    if ordering.is_empty() {
        return Ok(());
    }

    let alias = inner.table_alias().clone();
    let column = |i: usize| Fragment::column(&alias, &ordering[i].0.name);
    let value = |i: usize| Fragment::value(cursor.values[i].clone(), ordering[i].0.type_name.clone());

    let branches = (0..ordering.len()).map(|i| {
        let operator = match (side, ordering[i].1) {
            (CursorSide::After, OrderDirection::Asc) | (CursorSide::Before, OrderDirection::Desc) => " > ",
            _ => " < ",
        };
        let terms = (0..i)
            .map(|j| Fragment::eq(column(j), value(j)))
            .chain(std::iter::once(column(i).append_raw(operator).append(value(i))));
        Fragment::join(terms, " AND ").parens()
    });
    inner.add_filter(Fragment::join(branches, " OR "));
    Ok(())
}
