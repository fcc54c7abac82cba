//! # Catalogue Error Types
//!
//! Errors raised while loading an introspection snapshot or while deriving
//! relations from it.
//!
//! ## Error Categories
//!
//! - **Snapshot Errors**: file I/O and parsing issues while loading a catalogue
//! - **Consistency Errors**: the snapshot references tables or columns it does not contain
//!
//! Consistency errors abort a schema build. They always name the offending
//! table or constraint:
//!
//! ```ignore
//! CatalogError::MissingJunctionTable {
//!     constraint: "posts_tags_post_id_fkey".into(),
//!     table_id: 42,
//! }
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Could not find the table that referenced us (constraint: `{constraint}`, table id {table_id})")]
    MissingJunctionTable { constraint: String, table_id: u32 },
    #[error("Constraint `{constraint}` references table id {table_id}, which is not in the catalogue")]
    MissingForeignTable { constraint: String, table_id: u32 },
    #[error("Could not find key column #{num} of table `{table}` for constraint `{constraint}`")]
    UnresolvedKeyAttribute {
        constraint: String,
        table: String,
        num: i16,
    },
    #[error("Foreign key `{constraint}` has no key columns")]
    EmptyForeignKey { constraint: String },
    #[error("Duplicate table id {table_id} (`{first}` and `{second}`)")]
    DuplicateTable {
        table_id: u32,
        first: String,
        second: String,
    },
    #[error("Failed to read catalogue snapshot: {error}")]
    SnapshotRead { error: String },
    #[error("Failed to parse catalogue snapshot: {error}")]
    SnapshotParse { error: String },
}

impl CatalogError {
    /// Create a SnapshotParse error with context information
    ///
    /// # Example
    /// ```ignore
    /// CatalogError::parse_error_with_context(
    ///     err.to_string(),
    ///     "While loading fixtures/blog.yaml"
    /// )
    /// ```
    pub fn parse_error_with_context(error: impl Into<String>, context: impl Into<String>) -> Self {
        CatalogError::SnapshotParse {
            error: format!("{}\n  Context: {}", error.into(), context.into()),
        }
    }
}
