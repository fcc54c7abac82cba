//! PostgreSQL query construction: token-based fragments, the per-field query
//! builder and connection cursors.

pub mod cursor;
pub mod errors;
pub mod fragment;
pub mod query_builder;

pub use cursor::{add_start_end_cursor, Cursor};
pub use errors::QueryError;
pub use fragment::{quote_identifier, Alias, CompiledQuery, Fragment};
pub use query_builder::{
    json_build_object, Join, OrderByItem, OrderDirection, QueryBuilder, SelectItem,
};

pub trait ToSql {
    fn to_sql(&self) -> String;
}
