use thiserror::Error;

/// Errors raised while assembling the SQL for one query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("Missing junction table alias on query builder for `{field}` (condition applied outside a many-to-many field)")]
    MissingJunctionAlias { field: String },

    #[error("Unknown condition field `{name}` for `{field}`")]
    UnknownConditionField { field: String, name: String },

    #[error("Column `{column}` of table `{table}` does not exist or is not readable")]
    UnknownColumn { table: String, column: String },

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Cursor was created for ordering {found:?} but the query is ordered by {expected:?}")]
    CursorOrderingMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl QueryError {
    pub fn invalid_cursor_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        QueryError::InvalidCursor(format!("{}\n  Context: {}", message.into(), context.into()))
    }
}
