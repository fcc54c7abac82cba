//! Relation inference: finds junction tables and describes the implicit
//! many-to-many relations they encode.

mod descriptor;
mod inference;

pub use descriptor::RelationDescriptor;
pub(crate) use descriptor::RelationKeys;
pub use inference::infer_many_to_many;
