use thiserror::Error;

use crate::pg_catalog::CatalogError;

/// Errors that abort a schema build.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaBuildError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Could not determine the output type for {table} (needed by {origin})")]
    UnresolvedOutputType { table: String, origin: String },

    #[error("Could not determine the connection type for {table} (needed by {origin})")]
    UnresolvedConnectionType { table: String, origin: String },

    #[error("Type `{name}` is already registered")]
    DuplicateType { name: String },

    #[error("Field `{field}` is already defined on `{type_name}` (while adding {origin})")]
    DuplicateField {
        type_name: String,
        field: String,
        origin: String,
    },
}
