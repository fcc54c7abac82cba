//! Unit tests - public API pieces exercised in isolation
//!
//! No fixtures beyond inline catalogues; no database.

mod catalogue_snapshot_tests;
mod naming_tests;
mod omit_policy_tests;
