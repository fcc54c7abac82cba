pub mod builder;
pub mod errors;
pub mod field;
pub mod registry;

pub use builder::{BuildContext, ObjectType, Schema, SchemaBuilder, SchemaPlugin, Stage};
pub use errors::SchemaBuildError;
pub use field::{ArgSpec, FieldArgs, FieldResolver, FieldSpec, OrderSpec};
pub use registry::{InputField, InputObjectType, Registry, TypeRef, TypeRegistry};
