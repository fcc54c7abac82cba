//! Integration tests - schema builds and SQL assembly over catalogue fixtures
//!
//! These tests load YAML catalogue snapshots from `tests/fixtures` and drive
//! the public API end to end without a database.

mod blog_schema_tests;
mod pagination_tests;
