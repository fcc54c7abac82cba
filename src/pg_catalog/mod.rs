pub mod errors;
pub mod introspection;
pub mod omit;

#[cfg(test)]
pub mod testing;

pub use errors::CatalogError;
pub use introspection::{
    Attribute, Catalogue, Constraint, ConstraintKind, TableId, Table, TagValue, Tags,
};
pub use omit::{Action, AllowAll, Entity, OmitPolicy, TagOmitPolicy};
