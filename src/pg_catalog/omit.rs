//! Read/filter permission predicate.
//!
//! The schema generator asks `omit(entity, action)` before exposing anything.
//! Relation inference only uses it to decide whether a relation is visible;
//! an omitted entity is never an error.

use std::fmt;

use super::introspection::{Attribute, Constraint, TagValue, Table, Tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Filter,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Filter => "filter",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalogue entity the permission predicate can be asked about.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Table(&'a Table),
    Attribute(&'a Attribute),
    Constraint(&'a Constraint),
}

impl<'a> Entity<'a> {
    pub fn tags(&self) -> &'a Tags {
        match self {
            Entity::Table(t) => &t.tags,
            Entity::Attribute(a) => &a.tags,
            Entity::Constraint(c) => &c.tags,
        }
    }
}

/// Human-readable description used in log lines and build-error origins
impl fmt::Display for Entity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Table(t) => match &t.namespace {
                Some(ns) => write!(f, "table \"{}\".\"{}\"", ns, t.name),
                None => write!(f, "table \"{}\"", t.name),
            },
            Entity::Attribute(a) => write!(f, "column \"{}\" (#{})", a.name, a.num),
            Entity::Constraint(c) => write!(f, "constraint \"{}\"", c.name),
        }
    }
}

pub trait OmitPolicy: Send + Sync {
    /// `true` when `entity` must not be exposed for `action`
    fn omit(&self, entity: Entity<'_>, action: Action) -> bool;
}

impl<F> OmitPolicy for F
where
    F: Fn(Entity<'_>, Action) -> bool + Send + Sync,
{
    fn omit(&self, entity: Entity<'_>, action: Action) -> bool {
        self(entity, action)
    }
}

/// Exposes everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl OmitPolicy for AllowAll {
    fn omit(&self, _entity: Entity<'_>, _action: Action) -> bool {
        false
    }
}

/// Honours the `omit` tag: `true` hides the entity for every action, a
/// comma-separated string or a list hides it for the named actions only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagOmitPolicy;

impl OmitPolicy for TagOmitPolicy {
    fn omit(&self, entity: Entity<'_>, action: Action) -> bool {
        match entity.tags().get("omit") {
            Some(TagValue::Flag(flag)) => *flag,
            Some(TagValue::Text(actions)) => actions
                .split(',')
                .any(|a| a.trim().eq_ignore_ascii_case(action.as_str())),
            Some(TagValue::List(actions)) => actions
                .iter()
                .any(|a| a.trim().eq_ignore_ascii_case(action.as_str())),
            None => false,
        }
    }
}
