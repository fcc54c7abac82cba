pub mod alias_allocator;
pub mod inflection;

pub use alias_allocator::AliasAllocator;
pub use inflection::{pluralize, singularize, DefaultInflector, NamingStrategy};
