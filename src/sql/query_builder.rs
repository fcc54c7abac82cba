//! Mutable description of one `SELECT` while its fields are being resolved.
//!
//! A [`QueryBuilder`] is owned by the code that resolves one field. Nested
//! fields receive their parent's builder by shared reference and create a
//! fresh builder of their own via [`QueryBuilder::nested`], which inherits the
//! set of aliases visible from the enclosing scopes.

use serde::{Deserialize, Serialize};

use super::fragment::{Alias, Fragment};
use super::ToSql;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

impl ToSql for OrderDirection {
    fn to_sql(&self) -> String {
        match self {
            OrderDirection::Asc => "ASC".to_string(),
            OrderDirection::Desc => "DESC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expression: Fragment,
    pub direction: OrderDirection,
}

/// An `INNER JOIN`. Junction rows without a match on either side never
/// belong to a relation, so no other join kind is generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: Fragment,
    pub table_alias: Alias,
    /// ANDed together
    pub joining_on: Vec<Fragment>,
}

impl Join {
    pub fn inner(table: Fragment, table_alias: Alias, joining_on: Vec<Fragment>) -> Self {
        Self {
            table,
            table_alias,
            joining_on,
        }
    }

    pub fn to_fragment(&self) -> Fragment {
        let mut sql = Fragment::raw("INNER JOIN ")
            .append(self.table.clone())
            .append_raw(" AS ")
            .append(Fragment::alias(&self.table_alias))
            .append_raw(" ON ");
        if self.joining_on.is_empty() {
            sql.push_raw("TRUE");
        } else {
            sql.push(Fragment::join(self.joining_on.iter().cloned(), " AND ").parens());
        }
        sql
    }
}

/// A selected expression and the JSON key / column alias it is exposed as
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expression: Fragment,
    pub col_alias: String,
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: Fragment,
    table_alias: Alias,
    enclosing_aliases: Vec<Alias>,
    select: Vec<SelectItem>,
    joins: Vec<Join>,
    filters: Vec<Fragment>,
    order_by: Vec<OrderByItem>,
    order_is_unique: bool,
    cursor_prefix: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    junction_table_alias: Option<Alias>,
}

impl QueryBuilder {
    /// Root builder with no enclosing scope.
    pub fn new(table: Fragment, table_alias: Alias) -> Self {
        Self {
            table,
            table_alias,
            enclosing_aliases: Vec::new(),
            select: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            order_is_unique: false,
            cursor_prefix: Vec::new(),
            limit: None,
            offset: None,
            junction_table_alias: None,
        }
    }

    /// Builder for a correlated subquery inside `parent`.
    pub fn nested(table: Fragment, table_alias: Alias, parent: &QueryBuilder) -> Self {
        let mut builder = Self::new(table, table_alias);
        builder.enclosing_aliases = parent.visible_aliases();
        builder
    }

    pub fn table_alias(&self) -> &Alias {
        &self.table_alias
    }

    /// Aliases a subquery of this builder can see (and must not shadow)
    pub fn visible_aliases(&self) -> Vec<Alias> {
        let mut aliases = self.enclosing_aliases.clone();
        aliases.push(self.table_alias.clone());
        aliases.extend(self.joins.iter().map(|j| j.table_alias.clone()));
        if let Some(junction) = &self.junction_table_alias {
            if !aliases.contains(junction) {
                aliases.push(junction.clone());
            }
        }
        aliases
    }

    pub fn select(&mut self, expression: Fragment, col_alias: impl Into<String>) {
        self.select.push(SelectItem {
            expression,
            col_alias: col_alias.into(),
        });
    }

    pub fn select_items(&self) -> &[SelectItem] {
        &self.select
    }

    pub fn join(&mut self, join: Join) {
        self.joins.push(join);
    }

    pub fn add_filter(&mut self, predicate: Fragment) {
        self.filters.push(predicate);
    }

    pub fn filters(&self) -> &[Fragment] {
        &self.filters
    }

    pub fn order_by(&mut self, expression: Fragment, direction: OrderDirection) {
        self.order_by.push(OrderByItem {
            expression,
            direction,
        });
    }

    pub fn order_by_items(&self) -> &[OrderByItem] {
        &self.order_by
    }

    pub fn is_order_unique(&self) -> bool {
        self.order_is_unique
    }

    pub fn set_order_is_unique(&mut self) {
        self.order_is_unique = true;
    }

    /// Tags identifying the ordering, embedded at the front of every cursor
    pub fn cursor_prefix(&self) -> &[String] {
        &self.cursor_prefix
    }

    pub fn push_cursor_prefix(&mut self, tag: impl Into<String>) {
        self.cursor_prefix.push(tag.into());
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    pub fn set_junction_table_alias(&mut self, alias: Alias) {
        self.junction_table_alias = Some(alias);
    }

    pub fn junction_table_alias(&self) -> Option<&Alias> {
        self.junction_table_alias.as_ref()
    }

    /// `json_build_object('key', expr, ...)` over the selected items
    pub fn json_object(&self) -> Fragment {
        json_build_object(
            self.select
                .iter()
                .map(|item| (item.col_alias.as_str(), item.expression.clone())),
        )
    }

    pub fn from_clause(&self) -> Fragment {
        Fragment::raw("FROM ")
            .append(self.table.clone())
            .append_raw(" AS ")
            .append(Fragment::alias(&self.table_alias))
    }

    pub fn join_clause(&self) -> Fragment {
        let mut sql = Fragment::new();
        for join in &self.joins {
            sql.push_raw("\n");
            sql.push(join.to_fragment());
        }
        sql
    }

    pub fn where_clause(&self) -> Fragment {
        if self.filters.is_empty() {
            return Fragment::new();
        }
        Fragment::raw("\nWHERE ").append(Fragment::join(
            self.filters.iter().cloned().map(Fragment::parens),
            " AND ",
        ))
    }

    /// Comma separated `expr DIR` list, without the `ORDER BY` keyword
    pub fn order_by_list(&self) -> Fragment {
        Fragment::join(
            self.order_by.iter().map(|item| {
                item.expression
                    .clone()
                    .append_raw(&format!(" {}", item.direction.to_sql()))
            }),
            ", ",
        )
    }

    pub fn order_by_clause(&self) -> Fragment {
        if self.order_by.is_empty() {
            return Fragment::new();
        }
        Fragment::raw("\nORDER BY ").append(self.order_by_list())
    }

    pub fn limit_clause(&self) -> Fragment {
        let mut sql = Fragment::new();
        if let Some(limit) = self.limit {
            sql.push_raw(&format!("\nLIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_raw(&format!("\nOFFSET {}", offset));
        }
        sql
    }

    /// FROM, joins and WHERE; shared by every statement shape built on top.
    pub fn source_clauses(&self) -> Fragment {
        self.from_clause()
            .append(self.join_clause())
            .append(self.where_clause())
    }

    /// Plain `SELECT` with one column per selected item
    pub fn build(&self) -> Fragment {
        let columns = if self.select.is_empty() {
            Fragment::raw("1")
        } else {
            Fragment::join(
                self.select.iter().map(|item| {
                    item.expression
                        .clone()
                        .append_raw(" AS ")
                        .append(Fragment::identifier(&[item.col_alias.as_str()]))
                }),
                ", ",
            )
        };
        Fragment::raw("SELECT ")
            .append(columns)
            .append_raw("\n")
            .append(self.source_clauses())
            .append(self.order_by_clause())
            .append(self.limit_clause())
    }
}

impl ToSql for QueryBuilder {
    fn to_sql(&self) -> String {
        self.build().to_sql()
    }
}

/// `json_build_object('k1', v1, 'k2', v2, ...)`
pub fn json_build_object<'a>(entries: impl IntoIterator<Item = (&'a str, Fragment)>) -> Fragment {
    let args = Fragment::join(
        entries
            .into_iter()
            .map(|(key, value)| Fragment::literal(key).append_raw(", ").append(value)),
        ", ",
    );
    Fragment::raw("json_build_object(").append(args).append_raw(")")
}
