//! junctiongraph - many-to-many relation fields for PostgreSQL-backed GraphQL schemas
//!
//! This crate discovers many-to-many relations in a PostgreSQL catalogue
//! snapshot and turns them into schema fields:
//! - Relation inference over foreign keys that meet in a junction table
//! - Connection and simple collection fields, named by a pluggable inflector
//! - Condition input types over the junction table's own columns
//! - SQL generation as correlated subqueries with cursor pagination

pub mod config;
pub mod many_to_many;
pub mod pg_catalog;
pub mod relation_inference;
pub mod schema;
pub mod sql;
pub mod utils;

pub use config::{SchemaConfig, SimpleCollections};
pub use many_to_many::ManyToManyPlugin;
pub use pg_catalog::{Catalogue, CatalogError};
pub use relation_inference::{infer_many_to_many, RelationDescriptor};
pub use schema::{FieldArgs, FieldResolver, Schema, SchemaBuildError, SchemaBuilder};
pub use sql::{QueryBuilder, QueryError};
