//! Fresh table aliases for correlated subqueries.
//!
//! Every field resolution gets its own allocator. Aliases are numbered per
//! allocator (`__m2m_junction_1__`, ...) and any name already visible from an
//! enclosing scope is skipped, so a nested many-to-many field can never
//! shadow the aliases its parent query correlates on.

use std::collections::HashSet;

use crate::sql::Alias;

#[derive(Debug, Default)]
pub struct AliasAllocator {
    next: usize,
    taken: HashSet<String>,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator that never hands out any of `aliases`
    pub fn avoiding<'a>(aliases: impl IntoIterator<Item = &'a Alias>) -> Self {
        Self {
            next: 0,
            taken: aliases.into_iter().map(|a| a.as_str().to_string()).collect(),
        }
    }

    /// Next unused alias for `role`, e.g. `fresh("m2m_right")` -> `__m2m_right_1__`
    pub fn fresh(&mut self, role: &str) -> Alias {
        loop {
            self.next += 1;
            let candidate = format!("__{}_{}__", role, self.next);
            if self.taken.insert(candidate.clone()) {
                return Alias::new(candidate);
            }
            log::debug!("Alias {} already in scope, trying next", candidate);
        }
    }
}
